// Handlers module

pub mod assistant;
pub mod error;
pub mod reading;
pub mod stories;
pub mod students;
pub mod writing;

use std::sync::Arc;

use crate::gateway::GatewayClient;
use crate::reading::{AssistService, LibraryService, ReadingService, VocabularyService};
use crate::store::ReadingStore;

pub use error::{handle_rejection, ApiError};

/// Services behind the reading API, shared by every handler
pub struct ReadingApi {
    pub reading: ReadingService,
    pub library: LibraryService,
    pub vocabulary: VocabularyService,
    pub assist: AssistService,
}

pub type SharedReadingApi = Arc<ReadingApi>;

impl ReadingApi {
    pub fn new(store: Arc<dyn ReadingStore>, gateway: GatewayClient) -> Self {
        Self {
            reading: ReadingService::new(store.clone()),
            library: LibraryService::new(store.clone()),
            vocabulary: VocabularyService::new(store.clone(), gateway.clone()),
            assist: AssistService::new(store, gateway),
        }
    }
}
