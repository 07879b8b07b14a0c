//! Comment and reply domain types.

use cafe_and_wifi_core::{CafeId, CommentId, ReplyId, UserId};

/// A comment on a café, with its author's name and avatar resolved.
#[derive(Debug, Clone)]
pub struct Comment {
    pub id: CommentId,
    pub cafe_id: CafeId,
    pub author_id: UserId,
    pub author_name: String,
    /// Gravatar URL for the author.
    pub author_avatar: String,
    pub text: String,
    /// Creation date, `DD-MM-YYYY`.
    pub date: String,
    pub likes: i64,
}

/// A reply to a comment, with its author's name and avatar resolved.
#[derive(Debug, Clone)]
pub struct Reply {
    pub id: ReplyId,
    pub comment_id: CommentId,
    pub author_id: UserId,
    pub author_name: String,
    /// Gravatar URL for the author.
    pub author_avatar: String,
    pub text: String,
    /// Creation date, `DD-MM-YYYY`.
    pub date: String,
}

/// A comment together with its replies, in posting order.
#[derive(Debug, Clone)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Reply>,
}

impl CommentThread {
    /// Attach each reply to its comment, preserving the order of both lists.
    ///
    /// Replies whose comment is not in `comments` are dropped.
    #[must_use]
    pub fn assemble(comments: Vec<Comment>, replies: Vec<Reply>) -> Vec<Self> {
        let mut threads: Vec<Self> = comments
            .into_iter()
            .map(|comment| Self {
                comment,
                replies: Vec::new(),
            })
            .collect();

        for reply in replies {
            if let Some(thread) = threads
                .iter_mut()
                .find(|t| t.comment.id == reply.comment_id)
            {
                thread.replies.push(reply);
            }
        }

        threads
    }
}
