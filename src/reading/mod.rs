//! Story reading, progress tracking and the reader-facing services around it

pub mod achievement;
pub mod assist;
pub mod error;
pub mod library;
pub mod locks;
pub mod metrics;
pub mod paginator;
pub mod progress;
pub mod service;
pub mod vocabulary;

pub use achievement::Achievement;
pub use assist::{AssistService, GrammarCheck};
pub use error::{ReadingError, Result};
pub use library::{AuthorStats, LibraryService, StoryDraft, StoryPatch};
pub use metrics::StoryMetrics;
pub use paginator::{paginate, Page, WORDS_PER_PAGE};
pub use progress::{ReadingTrack, TrackState};
pub use service::{AchievementView, ReadView, ReadingService, TrackAction, TrackResult};
pub use vocabulary::{DictionaryAction, DictionaryOutcome, VocabularyService};
