// config.rs
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_maxage: i64,
    pub port: u16,
    // Listing rules
    pub listing_fee: f64,
    pub min_listing_price: f64,
    pub max_image_size_mb: usize,
    /// When set, a payment approval only activates the listing if the owner's
    /// identity documents are already verified.
    pub require_verified_owner: bool,
    // Seeded admin account
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn init() -> Config {
        let jwt_secret = std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set");

        let data_dir = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "data".to_string());
        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "uploads".to_string());

        Config {
            data_dir: PathBuf::from(data_dir),
            upload_dir: PathBuf::from(upload_dir),
            jwt_secret,
            jwt_maxage: env_or("JWT_MAXAGE", 60),
            port: env_or("PORT", 8000),
            listing_fee: env_or("LISTING_FEE", 250.0),
            min_listing_price: env_or("MIN_LISTING_PRICE", 100.0),
            max_image_size_mb: env_or("MAX_IMAGE_SIZE_MB", 5),
            require_verified_owner: env_or("REQUIRE_VERIFIED_OWNER", false),
            admin_email: std::env::var("ADMIN_EMAIL").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}, using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
impl Config {
    /// Defaults rooted in a scratch directory.
    pub fn for_tests(root: &std::path::Path) -> Config {
        Config {
            data_dir: root.join("data"),
            upload_dir: root.join("uploads"),
            jwt_secret: "test-secret".to_string(),
            jwt_maxage: 60,
            port: 0,
            listing_fee: 250.0,
            min_listing_price: 100.0,
            max_image_size_mb: 5,
            require_verified_owner: false,
            admin_email: None,
            admin_password: None,
        }
    }
}
