use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageDto {
    pub receiver_id: Uuid,
    pub listing_id: Uuid,
    #[validate(length(min = 1, max = 2000, message = "Message must be between 1 and 2000 characters"))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadQueryDto {
    pub other_party_id: Uuid,
    pub listing_id: Uuid,
}
