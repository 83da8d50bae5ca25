pub mod filename;
pub mod orchestrator;
pub mod registry;
pub mod selection;
pub mod stream;
pub mod url_parser;
pub mod ytdlp;
