pub mod answer;
pub mod handlers;
pub mod hierarchy;
pub mod normalize;
pub mod resolver;
pub mod similarity;

pub use answer::{AnswerGenerator, Credential, PromptAssistant, PromptTemplate};
pub use handlers::{AppState, router};
pub use hierarchy::{HierarchyTable, LoadError, TableStats, VillageEntry};
pub use normalize::Normalizer;
pub use resolver::{MATCH_THRESHOLD, MatchResult, MatchStrategy, Resolver, ResolverConfig, resolve};
