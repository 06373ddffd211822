//! Port for idea storage.
use async_trait::async_trait;

use crate::domain::{GroupId, Idea, IdeaId, IdeaView, NewIdea, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by idea repository adapters.
    pub enum IdeaRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "idea repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "idea repository query failed: {message}",
    }
}

/// Stored ideas. Reads skip soft-deleted ideas.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdeaRepository: Send + Sync {
    async fn insert(&self, idea: &NewIdea) -> Result<Idea, IdeaRepositoryError>;

    async fn find(&self, id: IdeaId) -> Result<Option<Idea>, IdeaRepositoryError>;

    /// Persist every mutable field including the soft-delete marker.
    async fn save(&self, idea: &Idea) -> Result<(), IdeaRepositoryError>;

    async fn view(&self, id: IdeaId) -> Result<Option<IdeaView>, IdeaRepositoryError>;

    /// Ideas in `group`, newest first.
    async fn list_for_group(&self, group: GroupId) -> Result<Vec<IdeaView>, IdeaRepositoryError>;

    /// Ideas written by `author`, newest first.
    async fn list_for_author(&self, author: &UserId)
    -> Result<Vec<IdeaView>, IdeaRepositoryError>;
}
