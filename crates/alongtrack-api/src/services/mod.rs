mod process;

pub use process::ProcessService;
