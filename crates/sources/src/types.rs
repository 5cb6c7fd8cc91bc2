//! Candidate types shared by the three recommendation sources.

use std::fmt;

/// Which source produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSource {
    /// Nearest neighbors in the title x user rating matrix
    Collaborative,
    /// TF-IDF title similarity
    Content,
    /// Most-rated titles overall
    Popularity,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CandidateSource::Collaborative => "collaborative",
            CandidateSource::Content => "content",
            CandidateSource::Popularity => "popularity",
        };
        f.write_str(name)
    }
}

/// A recommended title as produced by one source.
///
/// `base_score` is the source's own relevance measure and is only comparable
/// within one source: cosine similarity for the collaborative and content
/// sources, the rating count for popularity. The hybrid blend ignores it
/// and weights candidates by their position instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub title: String,
    pub source: CandidateSource,
    pub base_score: f32,
}

impl Candidate {
    pub fn new(title: impl Into<String>, source: CandidateSource, base_score: f32) -> Self {
        Self {
            title: title.into(),
            source,
            base_score,
        }
    }
}

/// Strip a candidate list down to its titles
pub fn titles(candidates: Vec<Candidate>) -> Vec<String> {
    candidates.into_iter().map(|c| c.title).collect()
}
