// src/client/votes.rs

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::comment::{Comment, VoteCounts, VoteKind};

/// Where votes are recorded.
#[async_trait]
pub trait VoteSink {
    type Error: Send;

    async fn send_vote(&self, comment_id: &str, kind: VoteKind) -> Result<VoteCounts, Self::Error>;
}

#[derive(Debug, Clone, Default)]
pub struct CommentVotes {
    counts: HashMap<String, VoteCounts>,
}

impl CommentVotes {
    pub fn from_comments(comments: &[Comment]) -> Self {
        let counts = comments
            .iter()
            .map(|c| {
                let counts = VoteCounts {
                    likes: c.likes,
                    dislikes: c.dislikes,
                };
                (c.id.clone(), counts)
            })
            .collect();
        Self { counts }
    }

    pub fn counts(&self, comment_id: &str) -> Option<VoteCounts> {
        self.counts.get(comment_id).copied()
    }

    /// Bumps the local counter at once, then records the vote remotely.
    ///
    /// On success the local counters take the server's values. On failure
    /// the local bump is undone and the error handed back.
    pub async fn vote<S>(
        &mut self,
        sink: &S,
        comment_id: &str,
        kind: VoteKind,
    ) -> Result<VoteCounts, S::Error>
    where
        S: VoteSink + Sync,
    {
        let previous = self.counts(comment_id);
        if let Some(mut local) = previous {
            match kind {
                VoteKind::Like => local.likes += 1,
                VoteKind::Dislike => local.dislikes += 1,
            }
            self.counts.insert(comment_id.to_string(), local);
        }

        match sink.send_vote(comment_id, kind).await {
            Ok(remote) => {
                self.counts.insert(comment_id.to_string(), remote);
                Ok(remote)
            }
            Err(e) => {
                tracing::warn!("Vote on comment {} failed, reverting", comment_id);
                match previous {
                    Some(counts) => self.counts.insert(comment_id.to_string(), counts),
                    None => self.counts.remove(comment_id),
                };
                Err(e)
            }
        }
    }
}
