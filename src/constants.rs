/// Constants used throughout Synaptiq
/// Extension tables, well-known folder names and the tuned defaults of the AI pipeline

/// Folder categories for the binary/media pre-sort phase.
/// Files matching one of these extensions never reach text extraction.
pub const MEDIA_CATEGORIES: &[(&str, &[&str])] = &[
    ("Images", &["jpg", "jpeg", "png", "gif", "svg", "webp"]),
    ("Videos", &["mp4", "mkv", "mov", "avi", "wmv"]),
    ("Audio", &["mp3", "wav", "flac"]),
    ("Execs", &["exe", "msi", "bat", "sh", "bin", "iso"]),
    ("Archives", &["zip", "rar", "7z", "tar", "gz"]),
];

/// Plain text, source code and configuration formats read as whole text
pub const PLAIN_TEXT_EXTENSIONS: &[&str] = &[
    "txt", "text", "md", "markdown", "rst", "log",
    "py", "js", "ts", "c", "cpp", "h", "hpp", "java", "rs", "go", "rb", "php",
    "json", "xml", "html", "htm", "css", "yml", "yaml", "toml", "ini", "cfg", "conf",
    "sql", "sh",
];

/// Delimited tabular text formats
pub const TABULAR_EXTENSIONS: &[&str] = &["csv", "tsv"];

/// Spreadsheet formats readable by calamine
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "ods"];

/// Folder used by the extension strategy for files without an extension
pub const NO_EXTENSION_FOLDER: &str = "no_extension";

/// Folder receiving AI candidates that yielded no usable text
pub const MISC_FOLDER: &str = "Misc_Files";

/// Folder name used when naming a cluster fails
pub const FALLBACK_GROUP_NAME: &str = "Group";

/// Folder name used when the model answer sanitizes to nothing
pub const EMPTY_NAME_FALLBACK: &str = "Misc_Docs";

/// Maximum characters kept from any extracted excerpt
pub const MAX_EXCERPT_CHARS: usize = 4000;

/// Excerpts shorter than this are treated as "no usable text"
pub const MIN_EXCERPT_CHARS: usize = 10;

/// Characters of an excerpt handed to the embedding model
pub const MAX_EMBED_CHARS: usize = 1000;

/// Default hierarchical clustering cut-off (Ward linkage on unit vectors)
pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 1.5;

/// Dimension of all-MiniLM-L6-v2 embeddings
pub const DEFAULT_EMBEDDING_DIMS: usize = 384;

/// Maximum length of a generated folder name
pub const MAX_FOLDER_NAME_CHARS: usize = 25;

/// Number of file previews shown to the naming model
pub const MAX_NAMING_PREVIEWS: usize = 5;

/// Characters of each excerpt shown to the naming model
pub const NAMING_PREVIEW_CHARS: usize = 150;

/// Default local chat model
pub const CHAT_MODEL_FILENAME: &str = "Llama-3.2-3B-Instruct-Q4_K_M.gguf";
pub const CHAT_MODEL_URL: &str =
    "https://huggingface.co/bartowski/Llama-3.2-3B-Instruct-GGUF/resolve/main/Llama-3.2-3B-Instruct-Q4_K_M.gguf";

/// Prefix of download progress lines; observers may overwrite successive lines sharing it
pub const DOWNLOAD_PREFIX: &str = "Downloading:";

/// Look up the media category folder for a lower-cased extension
pub fn media_category(extension: &str) -> Option<&'static str> {
    MEDIA_CATEGORIES
        .iter()
        .find(|(_, exts)| exts.contains(&extension))
        .map(|(folder, _)| *folder)
}
