use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::{chatdb::ChatExt, DBClient},
    models::chatmodels::{Conversation, Message},
    service::error::ServiceError,
};

#[derive(Debug)]
pub struct ChatService {
    db_client: Arc<DBClient>,
}

impl ChatService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn send(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        listing_id: Uuid,
        body: &str,
    ) -> Result<Message, ServiceError> {
        let body = body.trim();
        if body.is_empty() {
            return Err(ServiceError::Validation("Message cannot be empty".to_string()));
        }
        if sender_id == receiver_id {
            return Err(ServiceError::Validation(
                "You cannot message yourself".to_string(),
            ));
        }

        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            receiver_id,
            listing_id,
            body: body.to_string(),
            read: false,
            created_at: Utc::now(),
        };

        self.db_client
            .write(|c| -> Result<(), ServiceError> {
                if c.listing(listing_id).is_none() {
                    return Err(ServiceError::ListingNotFound(listing_id));
                }
                if !c.users.contains_key(&receiver_id) {
                    return Err(ServiceError::UserNotFound(receiver_id));
                }
                c.messages.push(message.clone());
                Ok(())
            })
            .await?;

        tracing::debug!("Message {} sent about listing {}", message.id, listing_id);

        Ok(message)
    }

    /// The user's conversations, latest activity first.
    pub async fn conversations(&self, user_id: Uuid) -> Vec<Conversation> {
        let messages = self.db_client.get_user_messages(user_id).await;
        group_conversations(user_id, messages)
    }

    pub async fn thread(&self, user_id: Uuid, other_party_id: Uuid, listing_id: Uuid) -> Vec<Message> {
        let mut messages = self
            .db_client
            .get_thread(user_id, other_party_id, listing_id)
            .await;
        // stable: equal timestamps keep insertion order
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        messages
    }
}

/// Groups messages by (other party, listing).
pub fn group_conversations(user_id: Uuid, messages: Vec<Message>) -> Vec<Conversation> {
    let mut grouped: HashMap<(Uuid, Uuid), Conversation> = HashMap::new();

    for message in messages.into_iter().filter(|m| m.involves(user_id)) {
        let key = (message.other_party(user_id), message.listing_id);
        match grouped.get_mut(&key) {
            Some(conversation) => {
                conversation.message_count += 1;
                if message.created_at >= conversation.last_message.created_at {
                    conversation.last_message = message;
                }
            }
            None => {
                grouped.insert(
                    key,
                    Conversation {
                        other_party_id: key.0,
                        listing_id: key.1,
                        last_message: message,
                        message_count: 1,
                    },
                );
            }
        }
    }

    let mut conversations: Vec<Conversation> = grouped.into_values().collect();
    conversations.sort_by(|a, b| b.last_message.created_at.cmp(&a.last_message.created_at));
    conversations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::{listing_dto, TestApp};
    use chrono::Duration;

    fn message(sender: Uuid, receiver: Uuid, listing: Uuid, minutes: i64) -> Message {
        Message {
            id: Uuid::new_v4(),
            sender_id: sender,
            receiver_id: receiver,
            listing_id: listing,
            body: "Is it still available?".to_string(),
            read: false,
            created_at: Utc::now() + Duration::minutes(minutes),
        }
    }

    #[test]
    fn test_group_by_other_party_and_listing() {
        let me = Uuid::new_v4();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let house = Uuid::new_v4();
        let flat = Uuid::new_v4();

        let messages = vec![
            message(alice, me, house, 0),
            message(me, alice, house, 1),
            message(alice, me, flat, 2),
            message(bob, me, house, 3),
            message(bob, alice, house, 4),
        ];

        let conversations = group_conversations(me, messages);

        assert_eq!(conversations.len(), 3);
        assert_eq!(conversations[0].other_party_id, bob);
        let alice_house = conversations
            .iter()
            .find(|c| c.other_party_id == alice && c.listing_id == house)
            .unwrap();
        assert_eq!(alice_house.message_count, 2);
        assert_eq!(alice_house.last_message.sender_id, me);
    }

    #[tokio::test]
    async fn test_send_and_read_thread() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;
        let renter = app.renter("renter@example.com").await;
        let (listing, _) = app.listings.submit(&owner, listing_dto("Modern 3BR", 2500.0)).await.unwrap();

        app.chat.send(renter.id, owner.id, listing.id, "Is it available?").await.unwrap();
        app.chat.send(owner.id, renter.id, listing.id, "Yes, come view it").await.unwrap();

        let thread = app.chat.thread(owner.id, renter.id, listing.id).await;
        assert_eq!(thread.len(), 2);
        assert_eq!(thread[0].body, "Is it available?");

        let inbox = app.chat.conversations(owner.id).await;
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].other_party_id, renter.id);
        assert_eq!(inbox[0].message_count, 2);
    }

    #[tokio::test]
    async fn test_send_rejects_bad_input() {
        let app = TestApp::new().await;
        let owner = app.owner("owner@example.com").await;
        let renter = app.renter("renter@example.com").await;
        let (listing, _) = app.listings.submit(&owner, listing_dto("Modern 3BR", 2500.0)).await.unwrap();

        let empty = app.chat.send(renter.id, owner.id, listing.id, "   ").await;
        assert!(matches!(empty, Err(ServiceError::Validation(_))));

        let self_message = app.chat.send(owner.id, owner.id, listing.id, "hi").await;
        assert!(matches!(self_message, Err(ServiceError::Validation(_))));

        let no_listing = app.chat.send(renter.id, owner.id, Uuid::new_v4(), "hi").await;
        assert!(matches!(no_listing, Err(ServiceError::ListingNotFound(_))));

        let no_receiver = app.chat.send(renter.id, Uuid::new_v4(), listing.id, "hi").await;
        assert!(matches!(no_receiver, Err(ServiceError::UserNotFound(_))));

        assert!(app.db_client.read(|c| c.messages.is_empty()).await);
    }
}
