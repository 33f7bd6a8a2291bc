// db/chatdb.rs
use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::chatmodels::Message;

#[async_trait]
pub trait ChatExt {
    /// All messages the user sent or received, in insertion order.
    async fn get_user_messages(&self, user_id: Uuid) -> Vec<Message>;

    async fn get_thread(&self, user_id: Uuid, other_party_id: Uuid, listing_id: Uuid) -> Vec<Message>;
}

#[async_trait]
impl ChatExt for DBClient {
    async fn get_user_messages(&self, user_id: Uuid) -> Vec<Message> {
        self.read(|c| {
            c.messages
                .iter()
                .filter(|m| m.involves(user_id))
                .cloned()
                .collect()
        })
        .await
    }

    async fn get_thread(&self, user_id: Uuid, other_party_id: Uuid, listing_id: Uuid) -> Vec<Message> {
        self.read(|c| {
            c.messages
                .iter()
                .filter(|m| {
                    m.listing_id == listing_id
                        && m.involves(user_id)
                        && m.other_party(user_id) == other_party_id
                })
                .cloned()
                .collect()
        })
        .await
    }
}
