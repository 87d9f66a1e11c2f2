// Resume example retrieval: a static index of example resumes loaded once at startup
// and matched against free-text requests with substring-tolerant fuzzy scoring.

pub mod corpus;
pub mod matcher;
pub mod similarity;
