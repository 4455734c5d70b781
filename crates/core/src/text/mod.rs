pub mod export;
pub mod postprocess;
