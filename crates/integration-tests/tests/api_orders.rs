//! Ordering, approval, and invoicing against a running seeded server.
//!
//! Run with: `cargo test -p seedmart-integration-tests -- --ignored`

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use seedmart_integration_tests::{
    ADMIN, INTER_STATE_BUYER, INTRA_STATE_BUYER, amount, base_url, credit_buyer, credit_position,
    expect_json, logged_in,
};

/// Find a seeded product by lot number.
async fn product_by_lot(client: &reqwest::Client, lot: &str) -> Value {
    let resp = client
        .get(format!("{}/api/products", base_url()))
        .send()
        .await
        .expect("Failed to list products");
    let products = expect_json(resp, StatusCode::OK).await;
    products
        .as_array()
        .expect("Product list is not an array")
        .iter()
        .find(|p| p["lot_number"] == lot)
        .cloned()
        .unwrap_or_else(|| panic!("Product {lot} not seeded"))
}

/// Place a minimum wheat order and return it.
async fn order_wheat(buyer: &reqwest::Client) -> Value {
    let wheat = product_by_lot(buyer, "WHT-2024-001").await;
    let resp = buyer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "product_id": wheat["id"], "quantity": 500 }] }))
        .send()
        .await
        .expect("Failed to place order");
    expect_json(resp, StatusCode::CREATED).await["order"].clone()
}

async fn approve(admin: &reqwest::Client, order_id: &Value) -> Value {
    let resp = admin
        .patch(format!("{}/api/orders/{order_id}", base_url()))
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .expect("Failed to approve order");
    expect_json(resp, StatusCode::OK).await["order"].clone()
}

async fn record_payment(admin: &reqwest::Client, buyer_id: &Value, paid: Decimal) {
    let resp = admin
        .post(format!("{}/api/admin/credit", base_url()))
        .json(&json!({ "buyer_id": buyer_id, "amount": paid.to_string(), "type": "credit" }))
        .send()
        .await
        .expect("Failed to record payment");
    let body = expect_json(resp, StatusCode::OK).await;
    assert_eq!(body["transaction"]["type"], "credit");
}

#[tokio::test]
#[ignore = "Requires running seeded server"]
async fn test_approval_charges_credit() {
    let admin = logged_in(ADMIN).await;
    let (buyer, buyer_id) = credit_buyer(&admin, "500000").await;

    let before = credit_position(&admin, &buyer_id).await;
    assert_eq!(amount(&before["buyer"]["used_credit"]), Decimal::ZERO);

    let order = order_wheat(&buyer).await;
    let grand_total = amount(&order["grand_total"]);
    assert!(grand_total > Decimal::ZERO);

    // Placing the order does not charge it yet
    let placed = credit_position(&admin, &buyer_id).await;
    assert_eq!(amount(&placed["buyer"]["used_credit"]), Decimal::ZERO);

    approve(&admin, &order["id"]).await;

    let after = credit_position(&admin, &buyer_id).await;
    assert_eq!(amount(&after["buyer"]["used_credit"]), grand_total);
    assert_eq!(
        amount(&after["buyer"]["available_credit"]),
        Decimal::from(500_000) - grand_total
    );
    let debit = &after["transactions"][0];
    assert_eq!(debit["type"], "debit");
    assert_eq!(debit["order_id"], order["id"]);
    assert_eq!(amount(&debit["amount"]), grand_total);

    // Re-approval does not charge twice
    approve(&admin, &order["id"]).await;
    let again = credit_position(&admin, &buyer_id).await;
    assert_eq!(amount(&again["buyer"]["used_credit"]), grand_total);
}

#[tokio::test]
#[ignore = "Requires running seeded server"]
async fn test_payment_lowers_used_credit_to_zero_floor() {
    let admin = logged_in(ADMIN).await;
    let (buyer, buyer_id) = credit_buyer(&admin, "500000").await;

    let order = order_wheat(&buyer).await;
    approve(&admin, &order["id"]).await;
    let grand_total = amount(&order["grand_total"]);

    let part = Decimal::from(1000);
    record_payment(&admin, &buyer_id, part).await;
    let position = credit_position(&admin, &buyer_id).await;
    assert_eq!(amount(&position["buyer"]["used_credit"]), grand_total - part);
    assert_eq!(position["transactions"][0]["type"], "credit");

    // Overpayment clamps at zero
    record_payment(&admin, &buyer_id, grand_total * Decimal::from(2)).await;
    let position = credit_position(&admin, &buyer_id).await;
    assert_eq!(amount(&position["buyer"]["used_credit"]), Decimal::ZERO);
    assert_eq!(amount(&position["buyer"]["available_credit"]), Decimal::from(500_000));
}

#[tokio::test]
#[ignore = "Requires running seeded server"]
async fn test_order_over_credit_limit_is_rejected() {
    let admin = logged_in(ADMIN).await;
    let (buyer, buyer_id) = credit_buyer(&admin, "1000").await;
    let wheat = product_by_lot(&buyer, "WHT-2024-001").await;

    let resp = buyer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "product_id": wheat["id"], "quantity": 500 }] }))
        .send()
        .await
        .expect("Failed to place order");
    let body = expect_json(resp, StatusCode::BAD_REQUEST).await;
    let message = body["error"].as_str().unwrap_or_default();
    assert!(message.contains("exceeds available credit (₹1,000.00)"), "{body}");
    assert!(message.ends_with("Contact admin."), "{body}");

    let position = credit_position(&admin, &buyer_id).await;
    assert_eq!(amount(&position["buyer"]["used_credit"]), Decimal::ZERO);
    assert!(position["transactions"].as_array().is_some_and(|t| {
        t.iter().all(|entry| entry["type"] != "debit")
    }));
}

#[tokio::test]
#[ignore = "Requires running seeded server"]
async fn test_below_moq_is_rejected() {
    let buyer = logged_in(INTRA_STATE_BUYER).await;
    let wheat = product_by_lot(&buyer, "WHT-2024-001").await;

    let resp = buyer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [{ "product_id": wheat["id"], "quantity": 499 }] }))
        .send()
        .await
        .expect("Failed to place order");
    let body = expect_json(resp, StatusCode::BAD_REQUEST).await;
    assert!(body["error"].as_str().unwrap_or_default().contains("MOQ"), "{body}");
}

#[tokio::test]
#[ignore = "Requires running seeded server"]
async fn test_empty_order_is_rejected() {
    let buyer = logged_in(INTRA_STATE_BUYER).await;
    let resp = buyer
        .post(format!("{}/api/orders", base_url()))
        .json(&json!({ "items": [] }))
        .send()
        .await
        .expect("Failed to place order");
    let body = expect_json(resp, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "No items in order");
}

#[tokio::test]
#[ignore = "Requires running seeded server"]
async fn test_inter_state_order_to_igst_invoice() {
    let base = base_url();
    let buyer = logged_in(INTER_STATE_BUYER).await;
    let cotton = product_by_lot(&buyer, "CTN-2024-007").await;

    // 1000 kg falls in the second tier at 700/kg, 5% GST
    let resp = buyer
        .post(format!("{base}/api/orders"))
        .json(&json!({
            "items": [{ "product_id": cotton["id"], "quantity": 1000 }],
            "notes": "Deliver to <b>Ludhiana</b> depot"
        }))
        .send()
        .await
        .expect("Failed to place order");
    let body = expect_json(resp, StatusCode::CREATED).await;
    let order = &body["order"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["total_amount"], "700000.00");
    assert_eq!(order["gst_amount"], "35000.00");
    assert_eq!(order["grand_total"], "735000.00");
    assert_eq!(order["notes"], "Deliver to Ludhiana depot");
    assert!(order["invoice"].is_null());
    let order_id = order["id"].clone();

    let admin = logged_in(ADMIN).await;
    let resp = admin
        .patch(format!("{base}/api/orders/{order_id}"))
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .expect("Failed to approve order");
    let body = expect_json(resp, StatusCode::OK).await;
    let invoice_id = body["order"]["invoice"]["id"].clone();
    assert!(invoice_id.is_number(), "approval did not issue an invoice: {body}");

    // Approving again must not issue a second invoice
    let resp = admin
        .patch(format!("{base}/api/orders/{order_id}"))
        .json(&json!({ "status": "approved" }))
        .send()
        .await
        .expect("Failed to approve order");
    let body = expect_json(resp, StatusCode::OK).await;
    assert_eq!(body["order"]["invoice"]["id"], invoice_id);

    let resp = buyer
        .get(format!("{base}/api/invoices/{invoice_id}"))
        .send()
        .await
        .expect("Failed to fetch invoice");
    assert_eq!(resp.status(), StatusCode::OK);
    let html = resp.text().await.expect("Failed to read invoice");
    assert!(html.contains("TAX INVOICE"));
    assert!(html.contains("IGST"));
    assert!(html.contains("Punjab Agro Traders"));

    // Another buyer cannot open it
    let other = logged_in(INTRA_STATE_BUYER).await;
    let resp = other
        .get(format!("{base}/api/invoices/{invoice_id}"))
        .send()
        .await
        .expect("Failed to fetch invoice");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "Requires running seeded server"]
async fn test_invalid_status_is_rejected() {
    let base = base_url();
    let buyer = logged_in(INTRA_STATE_BUYER).await;
    let rice = product_by_lot(&buyer, "RICE-2024-003").await;

    let resp = buyer
        .post(format!("{base}/api/orders"))
        .json(&json!({ "items": [{ "product_id": rice["id"], "quantity": 200 }] }))
        .send()
        .await
        .expect("Failed to place order");
    let body = expect_json(resp, StatusCode::CREATED).await;
    let order_id = body["order"]["id"].clone();

    let admin = logged_in(ADMIN).await;
    let resp = admin
        .patch(format!("{base}/api/orders/{order_id}"))
        .json(&json!({ "status": "lost" }))
        .send()
        .await
        .expect("Failed to update order");
    let body = expect_json(resp, StatusCode::BAD_REQUEST).await;
    assert_eq!(body["error"], "Invalid status");

    let resp = admin
        .patch(format!("{base}/api/orders/{order_id}"))
        .json(&json!({ "status": "cancelled" }))
        .send()
        .await
        .expect("Failed to update order");
    let body = expect_json(resp, StatusCode::OK).await;
    assert_eq!(body["order"]["status"], "cancelled");
}
