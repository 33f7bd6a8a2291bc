use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tempfile::TempDir;

use crate::{
    config::Config,
    db::{DBClient, UserExt},
    dtos::listingdtos::CreateListingDto,
    models::{
        listingmodel::{ListingType, PropertyType},
        usermodel::{User, UserRole},
    },
    service::{
        chat_service::ChatService, listing_service::ListingService,
        report_service::ReportService, verification_service::VerificationService,
    },
    utils::image_utils::ImageStore,
};

/// Services wired to a throwaway data directory.
pub struct TestApp {
    pub _dir: TempDir,
    pub db_client: Arc<DBClient>,
    pub listings: ListingService,
    pub verifications: VerificationService,
    pub chat: ChatService,
    pub reports: ReportService,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(adjust: impl FnOnce(&mut Config)) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::for_tests(dir.path());
        adjust(&mut config);

        let db_client = Arc::new(DBClient::open(&config.data_dir).await.unwrap());
        let images = ImageStore::new(&config.upload_dir, config.max_image_size_mb);

        TestApp {
            listings: ListingService::new(db_client.clone(), images.clone(), &config),
            verifications: VerificationService::new(db_client.clone(), images),
            chat: ChatService::new(db_client.clone()),
            reports: ReportService::new(db_client.clone()),
            db_client,
            _dir: dir,
        }
    }

    pub async fn owner(&self, email: &str) -> User {
        self.user(email, true, UserRole::User).await
    }

    pub async fn renter(&self, email: &str) -> User {
        self.user(email, false, UserRole::User).await
    }

    pub async fn user(&self, email: &str, is_owner: bool, role: UserRole) -> User {
        self.db_client
            .save_user("Test User", email, "+260971234567", "not-a-real-hash", is_owner, role)
            .await
            .unwrap()
    }
}

pub fn listing_dto(title: &str, price: f64) -> CreateListingDto {
    CreateListingDto {
        title: title.to_string(),
        description: "Spacious family home with a garden and borehole".to_string(),
        location: "Kabulonga, Lusaka".to_string(),
        price,
        listing_type: ListingType::Rent,
        property_type: PropertyType::House,
        bedrooms: Some(3),
        bathrooms: Some(2),
        amenities: vec!["parking".to_string()],
        images: vec![],
    }
}

pub fn proof_image() -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(b"\x89PNG fake image bytes"))
}
