//! Keyword-driven assistant replies.
//!
//! Rules are checked in order and the first match answers. Messages are
//! lowercased before matching.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use crate::catalogue::CatalogueItem;
use crate::types::format_inr;

static GREETING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(hi|hello|hey|namaste|namaskar)\b").expect("Invalid regex")
});
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"price|cost|rate|₹|rupee").expect("Invalid regex"));
static MOQ_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"moq|minimum order|min order").expect("Invalid regex"));
static SEASON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"season|rabi|kharif|zaid").expect("Invalid regex"));
static KYC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"kyc|register|distributor|apply|sign up").expect("Invalid regex"));
static GST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"gst|invoice|tax|billing").expect("Invalid regex"));
static STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(punjab|haryana|maharashtra|gujarat|rajasthan|karnataka)\b")
        .expect("Invalid regex")
});

/// Category keywords recognized in price questions.
const PRICE_CATEGORIES: &[&str] = &["wheat", "rice", "vegetable", "cotton", "pulse", "hybrid"];

const STATE_CROPS: &[(&str, &str, &str)] = &[
    ("punjab", "Punjab", "Wheat (HD-3086, PBW-550), Basmati rice, mustard"),
    ("haryana", "Haryana", "Wheat (WH-542, WH-711), paddy, cotton"),
    ("maharashtra", "Maharashtra", "BT cotton, soybean, tur (pigeon pea), vegetable hybrids"),
    ("gujarat", "Gujarat", "BT cotton, castor, groundnut, wheat"),
    ("rajasthan", "Rajasthan", "Wheat, bajra (pearl millet), moong and moth bean"),
    ("karnataka", "Karnataka", "Ragi, jowar, cotton, vegetable hybrids"),
];

/// What the assistant knows about the business.
#[derive(Debug, Clone, Copy)]
pub struct ChatContext<'a, P> {
    /// Active catalogue.
    pub products: &'a [P],
    pub seller_name: &'a str,
    pub seller_gstin: &'a str,
}

/// Answer a distributor's question.
pub fn reply<P: CatalogueItem>(message: &str, ctx: &ChatContext<'_, P>) -> String {
    let msg = message.trim().to_lowercase();

    if GREETING_RE.is_match(&msg) {
        return format!(
            "Namaste! I am the {} assistant. I can help with:\n\
             • Seed recommendations for your region\n\
             • Product specifications and germination rates\n\
             • Pricing and MOQ\n\
             • The ordering process\n\n\
             What would you like to know?",
            ctx.seller_name
        );
    }

    if msg.contains("germinat") {
        return "Every variety we sell is guaranteed at least 90% germination, and premium \
                lots reach 96-97%. Each lot is tested at an ICAR-approved laboratory; the lot \
                number and testing date are listed on the product page."
            .to_owned();
    }

    if PRICE_RE.is_match(&msg) {
        return price_reply(&msg, ctx.products);
    }

    if MOQ_RE.is_match(&msg) {
        return "MOQ (minimum order quantity) depends on the variety:\n\
                • Field crop seed: 100-1000 kg\n\
                • Vegetable hybrids: from 1 kg\n\n\
                The exact MOQ is shown on every product page and enforced at checkout."
            .to_owned();
    }

    if SEASON_RE.is_match(&msg) {
        return season_reply(&msg).to_owned();
    }

    if let Some(reply) = state_reply(&msg) {
        return reply;
    }

    if KYC_RE.is_match(&msg) {
        return "To become a distributor:\n\
                1. Register with your company details\n\
                2. Enter your GST and PAN numbers\n\
                3. Add your business address and state\n\
                4. Attach your GST certificate\n\
                5. Wait for KYC approval (usually 24-48 hours)\n\n\
                Once approved you can place bulk orders straight away."
            .to_owned();
    }

    if GST_RE.is_match(&msg) {
        return format!(
            "GST and invoicing:\n\
             • Our GSTIN is {}\n\
             • Most seed is 0% GST; treated and hybrid vegetable seed is 5%\n\
             • A tax invoice is generated automatically when your order is approved\n\
             • Same-state orders carry CGST + SGST, inter-state orders carry IGST\n\
             • Invoices can be opened from your order history",
            ctx.seller_gstin
        );
    }

    format!(
        "I'm here to help! We currently have {} active seed varieties across wheat, rice, \
         vegetables, hybrids, cotton and pulses.\n\n\
         Try asking:\n\
         • \"What seeds suit Punjab in the rabi season?\"\n\
         • \"What is the germination rate?\"\n\
         • \"What are the prices for wheat seed?\"\n\
         • \"How do I register as a distributor?\"",
        ctx.products.len()
    )
}

fn price_reply<P: CatalogueItem>(msg: &str, products: &[P]) -> String {
    let listing = PRICE_CATEGORIES
        .iter()
        .find(|keyword| {
            msg.split(|c: char| !c.is_alphanumeric())
                .any(|word| word.starts_with(**keyword))
        })
        .and_then(|keyword| {
            let mut lines = String::new();
            for product in products
                .iter()
                .filter(|p| p.category().to_lowercase().contains(keyword))
                .take(3)
            {
                let price = product
                    .tier_pricing()
                    .base_price()
                    .map_or_else(|| "on request".to_owned(), |p| format!("{}/kg", format_inr(p)));
                let _ = writeln!(
                    lines,
                    "• {}: {price} (MOQ: {} kg)",
                    product.variety_name(),
                    product.moq()
                );
            }
            (!lines.is_empty()).then(|| (*keyword, lines))
        });

    match listing {
        Some((keyword, lines)) => format!(
            "Here are our {keyword} seed prices:\n\n{lines}\n\
             Prices are per kg at the minimum order. Larger quantities unlock lower \
             tier prices; log in to see the full tier table."
        ),
        None => "Pricing depends on the variety and quantity. Every product has bulk tiers, \
                 so the more you order the lower the price per kg. Log in to your distributor \
                 account to see the tier table for each product."
            .to_owned(),
    }
}

fn season_reply(msg: &str) -> &'static str {
    if msg.contains("rabi") {
        "Rabi season (October to March):\n\
         • Wheat varieties such as RH-749 and HD-2967\n\
         • Mustard, barley, gram (chickpea)\n\
         • Sow October to November, harvest March to April"
    } else if msg.contains("kharif") {
        "Kharif season (June to October):\n\
         • Rice, cotton, maize, soybean\n\
         • Vegetable hybrids: tomato, brinjal, chilli\n\
         • Sow June to July after the monsoon arrives, harvest September to October"
    } else {
        "We stock seed for all three seasons:\n\
         • Rabi (October to March): wheat, gram, mustard\n\
         • Kharif (June to October): rice, cotton, vegetables\n\
         • Zaid (March to June): summer vegetables\n\n\
         The seed advisor can suggest varieties for your state and season."
    }
}

fn state_reply(msg: &str) -> Option<String> {
    let key = STATE_RE.captures(msg)?.get(1)?.as_str();
    let (_, name, crops) = STATE_CROPS.iter().find(|(k, _, _)| *k == key)?;
    Some(format!(
        "Top recommended crops for {name}:\n\n{crops}\n\n\
         The seed advisor can tailor this to your soil type and budget."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalogue::fixtures::{self, Seed};

    fn ask(message: &str) -> String {
        let products = vec![fixtures::wheat(), fixtures::tomato(), fixtures::cotton()];
        let ctx = ChatContext {
            products: &products,
            seller_name: "Tanindo Seeds Pvt Ltd",
            seller_gstin: "27AAPFU0939F1ZV",
        };
        reply(message, &ctx)
    }

    #[test]
    fn test_greeting() {
        assert!(ask("Namaste ji").contains("Tanindo Seeds Pvt Ltd assistant"));
        assert!(ask("hello").starts_with("Namaste!"));
    }

    #[test]
    fn test_greeting_needs_whole_word() {
        // "history" starts with "hi"
        assert!(!ask("history of rabi wheat").starts_with("Namaste!"));
    }

    #[test]
    fn test_germination_rate_is_not_a_price_question() {
        assert!(ask("What is the germination rate?").contains("ICAR"));
    }

    #[test]
    fn test_price_listing_for_category() {
        let answer = ask("price of wheat seed?");
        assert!(answer.contains("• RH-749 Wheat: ₹85.00/kg (MOQ: 500 kg)"), "{answer}");
    }

    #[test]
    fn test_price_without_category() {
        assert!(ask("what does it cost").starts_with("Pricing depends"));
        // no rice in the fixture catalogue
        assert!(ask("rice price").starts_with("Pricing depends"));
        // "price" must not be read as "rice"
        assert!(ask("vegetables price").contains("SVS-301 F1 Hybrid Tomato"));
    }

    #[test]
    fn test_moq_and_seasons() {
        assert!(ask("what is the moq").starts_with("MOQ"));
        assert!(ask("best for kharif?").starts_with("Kharif season"));
        assert!(ask("rabi sowing").starts_with("Rabi season"));
        assert!(ask("which season").starts_with("We stock seed for all three seasons"));
    }

    #[test]
    fn test_state_word_boundary() {
        assert!(ask("crops for Gujarat").contains("Top recommended crops for Gujarat"));
        // "upkeep" must not trigger a state answer, falls through to fallback
        assert!(ask("upkeep tips").contains("3 active seed varieties"));
    }

    #[test]
    fn test_kyc_and_gst() {
        assert!(ask("how do I register").starts_with("To become a distributor"));
        assert!(ask("need gst invoice").contains("27AAPFU0939F1ZV"));
    }

    #[test]
    fn test_empty_catalogue_fallback() {
        let products: Vec<Seed> = Vec::new();
        let ctx = ChatContext {
            products: &products,
            seller_name: "Tanindo",
            seller_gstin: "27AAPFU0939F1ZV",
        };
        assert!(reply("???", &ctx).contains("0 active seed varieties"));
    }
}
