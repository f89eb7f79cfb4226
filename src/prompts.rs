/// Version tag of the analysis prompt; bump alongside the template file.
pub const ANALYSIS_VERSION: &str = "v1";
pub const ANALYSIS: &str = include_str!("../data/prompts/analysis_v1.txt");

/// Display text of the first user turn in a session.
pub const ANALYZE_REQUEST: &str = "Analyze this document";
