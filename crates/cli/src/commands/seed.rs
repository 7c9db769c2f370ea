//! Demo data: one admin, two approved buyers, and the seed catalogue.
//!
//! Safe to run repeatedly. Accounts are only inserted when their email is
//! free; products are matched on lot number and overwritten.
//!
//! | Account             | Password | Notes                          |
//! |---------------------|----------|--------------------------------|
//! | `admin@seedsco.com` | admin123 | admin                          |
//! | `buyer@test.com`    | buyer123 | Maharashtra, intra-state GST   |
//! | `punjab@test.com`   | buyer123 | Punjab, inter-state IGST       |

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use seedmart_core::{KycStatus, PriceTier, TierPricing, UserRole};
use seedmart_server::db::{ProductRepository, RepositoryError};
use seedmart_server::models::ProductInput;
use seedmart_server::services::auth::{AuthError, hash_password};

use super::{CommandError, connect};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Password hashing failed: {0}")]
    Password(#[from] AuthError),

    #[error("Invalid demo product {0}")]
    InvalidProduct(&'static str),
}

struct DemoAccount {
    email: &'static str,
    password: &'static str,
    role: UserRole,
    company_name: &'static str,
    phone: Option<&'static str>,
    gst_number: Option<&'static str>,
    pan_number: Option<&'static str>,
    state: Option<&'static str>,
    district: Option<&'static str>,
    pincode: Option<&'static str>,
    address: Option<&'static str>,
    credit_limit: i64,
    credit_enabled: bool,
}

const ACCOUNTS: &[DemoAccount] = &[
    DemoAccount {
        email: "admin@seedsco.com",
        password: "admin123",
        role: UserRole::Admin,
        company_name: "Tanindo Seeds Pvt Ltd",
        phone: None,
        gst_number: None,
        pan_number: None,
        state: None,
        district: None,
        pincode: None,
        address: None,
        credit_limit: 0,
        credit_enabled: false,
    },
    DemoAccount {
        email: "buyer@test.com",
        password: "buyer123",
        role: UserRole::Buyer,
        company_name: "Demo Agro Distributors",
        phone: Some("9876543210"),
        gst_number: Some("27AABCU9603R1ZX"),
        pan_number: Some("AABCU9603R"),
        state: Some("Maharashtra"),
        district: Some("Nagpur"),
        pincode: Some("440001"),
        address: Some("12 Agro Complex, Nagpur"),
        credit_limit: 500_000,
        credit_enabled: true,
    },
    DemoAccount {
        email: "punjab@test.com",
        password: "buyer123",
        role: UserRole::Buyer,
        company_name: "Punjab Agro Traders",
        phone: Some("9812345678"),
        gst_number: Some("03AABCU9603R1ZX"),
        pan_number: Some("AABCU9604R"),
        state: Some("Punjab"),
        district: Some("Ludhiana"),
        pincode: Some("141001"),
        address: Some("88 Grain Market, Ludhiana"),
        credit_limit: 750_000,
        credit_enabled: false,
    },
];

struct DemoProduct {
    crop_name: &'static str,
    variety_name: &'static str,
    category: &'static str,
    germination_pct: i64,
    /// Tenths of a percent.
    purity_tenths: i64,
    lot_number: &'static str,
    batch_id: &'static str,
    manufacturing_date: &'static str,
    expiry_date: &'static str,
    date_of_testing: &'static str,
    yield_per_acre: &'static str,
    suitable_season: &'static str,
    suitable_regions: &'static str,
    hsn_code: &'static str,
    gst_rate: i64,
    moq: i32,
    stock_quantity: i32,
    description: &'static str,
    is_featured: bool,
    /// `(min_qty, max_qty, price_per_kg)`
    tiers: &'static [(i32, Option<i32>, i64)],
}

impl DemoProduct {
    fn to_input(&self) -> ProductInput {
        ProductInput {
            crop_name: self.crop_name.to_owned(),
            variety_name: self.variety_name.to_owned(),
            category: self.category.to_owned(),
            description: self.description.to_owned(),
            germination_pct: Decimal::from(self.germination_pct),
            purity_pct: Decimal::new(self.purity_tenths, 1),
            lot_number: self.lot_number.to_owned(),
            batch_id: self.batch_id.to_owned(),
            manufacturing_date: self.manufacturing_date.to_owned(),
            expiry_date: self.expiry_date.to_owned(),
            date_of_testing: self.date_of_testing.to_owned(),
            yield_per_acre: self.yield_per_acre.to_owned(),
            suitable_season: self.suitable_season.to_owned(),
            suitable_regions: self.suitable_regions.to_owned(),
            hsn_code: self.hsn_code.to_owned(),
            gst_rate: Decimal::from(self.gst_rate),
            moq: self.moq,
            stock_quantity: self.stock_quantity,
            tier_pricing: TierPricing::new(
                self.tiers
                    .iter()
                    .map(|&(min_qty, max_qty, price)| PriceTier {
                        min_qty,
                        max_qty,
                        price_per_unit: Decimal::from(price),
                    })
                    .collect(),
            ),
            is_featured: self.is_featured,
            is_active: true,
        }
    }
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        crop_name: "Wheat",
        variety_name: "RH-749 Wheat",
        category: "Wheat",
        germination_pct: 94,
        purity_tenths: 990,
        lot_number: "WHT-2024-001",
        batch_id: "BATCH-WHT-2024-A01",
        manufacturing_date: "Sep 2024",
        expiry_date: "Aug 2025",
        date_of_testing: "Nov 2024",
        yield_per_acre: "20-25 quintals",
        suitable_season: "Rabi",
        suitable_regions: "Punjab, Haryana, UP, Wheat Belt, North India",
        hsn_code: "1001",
        gst_rate: 0,
        moq: 500,
        stock_quantity: 5000,
        description: "High-yielding wheat variety bred for the Indo-Gangetic plains. Resistant \
                      to yellow rust and lodging. Recommended for Rabi sowing in north India.",
        is_featured: true,
        tiers: &[(500, Some(999), 85), (1000, Some(4999), 80), (5000, None, 74)],
    },
    DemoProduct {
        crop_name: "Rice",
        variety_name: "Pusa Basmati 1121",
        category: "Rice",
        germination_pct: 96,
        purity_tenths: 995,
        lot_number: "RICE-2024-003",
        batch_id: "BATCH-RICE-2024-B03",
        manufacturing_date: "Aug 2024",
        expiry_date: "Jul 2025",
        date_of_testing: "Oct 2024",
        yield_per_acre: "18-22 quintals",
        suitable_season: "Kharif",
        suitable_regions: "Punjab, Haryana, Delta Region, North India, Basmati Belt",
        hsn_code: "1006",
        gst_rate: 0,
        moq: 200,
        stock_quantity: 3000,
        description: "Premium extra-long grain Basmati with exceptional aroma. 96% germination \
                      guaranteed. Export-quality standard.",
        is_featured: true,
        tiers: &[(200, Some(499), 120), (500, Some(1999), 110), (2000, None, 98)],
    },
    DemoProduct {
        crop_name: "Tomato",
        variety_name: "SVS-301 F1 Hybrid Tomato",
        category: "Vegetable",
        germination_pct: 93,
        purity_tenths: 980,
        lot_number: "VEG-2024-012",
        batch_id: "BATCH-VEG-2024-C12",
        manufacturing_date: "Jun 2024",
        expiry_date: "May 2025",
        date_of_testing: "Sep 2024",
        yield_per_acre: "25-35 tonnes",
        suitable_season: "All season",
        suitable_regions: "All India, Maharashtra, Karnataka, Tamil Nadu",
        hsn_code: "1209",
        gst_rate: 5,
        moq: 1,
        stock_quantity: 200,
        description: "Indeterminate F1 hybrid tomato. Deep red, firm fruits with 60-day shelf \
                      life. Suitable for ketchup and fresh market. Virus-resistant.",
        is_featured: true,
        tiers: &[(1, Some(4), 18_000), (5, Some(19), 16_500), (20, None, 15_000)],
    },
    DemoProduct {
        crop_name: "Cotton",
        variety_name: "BT Bollgard II Cotton",
        category: "Cotton",
        germination_pct: 90,
        purity_tenths: 970,
        lot_number: "CTN-2024-007",
        batch_id: "BATCH-CTN-2024-D07",
        manufacturing_date: "Feb 2024",
        expiry_date: "Jan 2025",
        date_of_testing: "Mar 2024",
        yield_per_acre: "12-18 quintals",
        suitable_season: "Kharif",
        suitable_regions: "Cotton Belt, Maharashtra, Gujarat, Telangana",
        hsn_code: "5201",
        gst_rate: 5,
        moq: 300,
        stock_quantity: 1500,
        description: "Bollworm-resistant BT cotton with high fiber strength. Suitable for \
                      Vidarbha and Gujarat cotton belt. Proven performance over 5 seasons.",
        is_featured: false,
        tiers: &[(300, Some(999), 750), (1000, Some(2999), 700), (3000, None, 650)],
    },
    DemoProduct {
        crop_name: "Maize",
        variety_name: "DEKALB 9081 Hybrid Maize",
        category: "Hybrid",
        germination_pct: 95,
        purity_tenths: 985,
        lot_number: "HYB-2024-019",
        batch_id: "BATCH-HYB-2024-E19",
        manufacturing_date: "May 2024",
        expiry_date: "Apr 2025",
        date_of_testing: "Aug 2024",
        yield_per_acre: "28-35 quintals",
        suitable_season: "Kharif",
        suitable_regions: "All India, Karnataka, Maharashtra, Bihar, North India",
        hsn_code: "1005",
        gst_rate: 0,
        moq: 100,
        stock_quantity: 2000,
        description: "High-density hybrid maize with tolerance to waterlogging and drought \
                      stress. Widely adaptable with exceptional standability.",
        is_featured: true,
        tiers: &[(100, Some(499), 280), (500, Some(1999), 260), (2000, None, 240)],
    },
    DemoProduct {
        crop_name: "Chickpea (Gram)",
        variety_name: "JG-14 Chickpea",
        category: "Pulses",
        germination_pct: 92,
        purity_tenths: 990,
        lot_number: "PLS-2024-005",
        batch_id: "BATCH-PLS-2024-F05",
        manufacturing_date: "Jul 2024",
        expiry_date: "Jun 2025",
        date_of_testing: "Oct 2024",
        yield_per_acre: "8-12 quintals",
        suitable_season: "Rabi",
        suitable_regions: "Central India, Madhya Pradesh, Rajasthan, Maharashtra",
        hsn_code: "0713",
        gst_rate: 0,
        moq: 200,
        stock_quantity: 800,
        description: "High-yielding desi chickpea (gram) variety. Wilt-resistant with bold \
                      seeds. Popular in Madhya Pradesh and Rajasthan.",
        is_featured: false,
        tiers: &[(200, Some(499), 95), (500, Some(1999), 88), (2000, None, 80)],
    },
    DemoProduct {
        crop_name: "Brinjal",
        variety_name: "Arka Kiran F1 Brinjal",
        category: "Vegetable",
        germination_pct: 91,
        purity_tenths: 970,
        lot_number: "VEG-2024-018",
        batch_id: "BATCH-VEG-2024-G18",
        manufacturing_date: "Apr 2024",
        expiry_date: "Mar 2025",
        date_of_testing: "Jul 2024",
        yield_per_acre: "20-30 tonnes",
        suitable_season: "Kharif",
        suitable_regions: "South India, Tamil Nadu, Karnataka, Andhra Pradesh",
        hsn_code: "1209",
        gst_rate: 5,
        moq: 1,
        stock_quantity: 80,
        description: "Purple oval F1 hybrid brinjal with high yield potential. Suitable for \
                      fresh market and processing. Good shelf life.",
        is_featured: false,
        tiers: &[(1, Some(9), 12_000), (10, Some(49), 11_000), (50, None, 10_000)],
    },
    DemoProduct {
        crop_name: "Soybean",
        variety_name: "JS 9305 Soybean",
        category: "Hybrid",
        germination_pct: 93,
        purity_tenths: 980,
        lot_number: "HYB-2024-022",
        batch_id: "BATCH-HYB-2024-H22",
        manufacturing_date: "Mar 2024",
        expiry_date: "Feb 2025",
        date_of_testing: "Jun 2024",
        yield_per_acre: "15-20 quintals",
        suitable_season: "Kharif",
        suitable_regions: "Central India, Madhya Pradesh, Maharashtra, Rajasthan",
        hsn_code: "1201",
        gst_rate: 0,
        moq: 500,
        stock_quantity: 3500,
        description: "High-protein soybean variety with resistance to pod shattering and broad \
                      adaptation across central India.",
        is_featured: false,
        tiers: &[(500, Some(1999), 75), (2000, Some(4999), 70), (5000, None, 65)],
    },
];

/// Seed the demo accounts and catalogue.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn run() -> Result<(), SeedError> {
    let pool = connect().await?;

    info!("Seeding demo data...");

    for account in ACCOUNTS {
        if insert_account(&pool, account).await? {
            info!(email = account.email, role = %account.role, "Account created");
        } else {
            info!(email = account.email, "Account exists, left unchanged");
        }
    }

    let products = ProductRepository::new(&pool);
    for demo in PRODUCTS {
        let input = demo
            .to_input()
            .validate()
            .map_err(|_| SeedError::InvalidProduct(demo.lot_number))?;
        let product = products.upsert_by_lot(&input).await?;
        info!(product_id = %product.id, lot = demo.lot_number, "Product upserted");
    }

    info!("Demo data ready");
    for account in ACCOUNTS {
        info!("  {} / {}", account.email, account.password);
    }
    Ok(())
}

/// Returns `false` when the email is already registered.
async fn insert_account(pool: &PgPool, account: &DemoAccount) -> Result<bool, SeedError> {
    let password_hash = hash_password(account.password)?;

    let inserted = sqlx::query(
        "INSERT INTO seedmart.users \
            (email, password_hash, role, company_name, phone, gst_number, pan_number, \
             state, district, pincode, address, kyc_status, kyc_approved_at, \
             credit_limit, credit_enabled) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW(), $13, $14) \
         ON CONFLICT (email) DO NOTHING",
    )
    .bind(account.email)
    .bind(password_hash)
    .bind(account.role)
    .bind(account.company_name)
    .bind(account.phone)
    .bind(account.gst_number)
    .bind(account.pan_number)
    .bind(account.state)
    .bind(account.district)
    .bind(account.pincode)
    .bind(account.address)
    .bind(KycStatus::Approved)
    .bind(Decimal::from(account.credit_limit))
    .bind(account.credit_enabled)
    .execute(pool)
    .await?
    .rows_affected();

    Ok(inserted > 0)
}
