//! # Sources Crate
//!
//! The three recommendation sources blended by the hybrid recommender, plus
//! the building blocks they share.
//!
//! ## Components
//!
//! ### Neighbor Model (Collaborative)
//! "Readers who rated this book also rated...":
//! - Sparse title x user rating matrix of popular titles (>= 50 ratings)
//! - Exact brute-force cosine kNN over matrix rows
//!
//! ### Content Model
//! "Books with similar titles":
//! - TF-IDF over the titles of very popular books (>= 80 ratings)
//! - Precomputed pairwise cosine similarity
//!
//! ### Popularity Ranker
//! Most-rated titles overall, the fallback when nothing matches.
//!
//! ### Title Matcher
//! Case-insensitive substring lookup from a user query to a known title.
//!
//! ## Example Usage
//!
//! ```ignore
//! use sources::{ContentModel, NeighborModel, PopularityRanker};
//!
//! let knn = NeighborModel::build(&table);
//! let content = ContentModel::build(&table);
//! let popular = PopularityRanker::build(&table);
//!
//! let similar = knn.knn_recommend("The Lovely Bones", 5);
//! let same_words = content.content_recommend("The Lovely Bones", 5);
//! let top = popular.popularity_based(5);
//! ```

pub mod collaborative;
pub mod content;
pub mod matcher;
pub mod matrix;
pub mod popularity;
pub mod stop_words;
pub mod tfidf;
pub mod types;

pub use collaborative::NeighborModel;
pub use content::ContentModel;
pub use matcher::{find_all_matches, find_best_match, find_best_match_index};
pub use matrix::{RatingMatrix, SparseRow};
pub use popularity::PopularityRanker;
pub use stop_words::ENGLISH_STOP_WORDS;
pub use tfidf::{TfidfMatrix, TfidfVectorizer};
pub use types::{Candidate, CandidateSource};
