//! Builds a payment button from a checkout request, encrypted when credentials exist.
//!
//! # Running this example
//!
//! Generate a merchant key pair and upload the certificate to PayPal:
//! ```bash
//! mkdir -p config/paypal
//! openssl req -x509 -newkey rsa:2048 -nodes -days 365 -subj "/CN=shop" \
//!     -keyout config/paypal/paypal-prvkey.pem -out config/paypal/paypal-pubcert.pem
//! ```
//!
//! Save PayPal's public certificate as `config/paypal/paypal-cert.pem`, then:
//! ```bash
//! export PAYPAL_CERT_ID=<id PayPal assigned to your certificate>
//! cargo run --example encrypted_button
//! ```

#![allow(
    clippy::print_stdout,
    clippy::print_stderr,
    reason = "examples are allowed to use println"
)]

use std::env;

use paypal_standard::{
    config::CredentialConfig,
    envelope::EnvelopeBuilder,
    form::{Address, CheckoutRequest, LineItem},
    mapping::MappingTable,
};
use rust_decimal::Decimal;

fn render(action: &str, fields: &paypal_standard::form::FieldSet) {
    println!("<form action=\"{action}\" method=\"post\">");
    for (name, value) in fields.iter() {
        println!("  <input type=\"hidden\" name=\"{name}\" value=\"{value}\">");
    }
    println!("</form>");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let request = CheckoutRequest {
        order: "1000".to_owned(),
        invoice: Some("#1000".to_owned()),
        currency: Some("CAD".to_owned()),
        notify_url: Some("https://shop.example.com/paypal/ipn".to_owned()),
        shipping_address: Some(Address {
            address1: Some("21 Snowy Brook Lane".to_owned()),
            city: Some("Ottawa".to_owned()),
            state: Some("ON".to_owned()),
            zip: Some("K1J1E5".to_owned()),
            country: Some("Canada".to_owned()),
            phone: Some("(613) 555-0199".to_owned()),
            ..Address::default()
        }),
        line_items: vec![
            LineItem { name: "Snowshoes".to_owned(), price: Decimal::new(2500, 2), quantity: 2 },
            LineItem { name: "Poles".to_owned(), price: Decimal::new(1050, 2), quantity: 1 },
        ],
        ..CheckoutRequest::default()
    };

    let form = request.to_form(MappingTable::paypal(), "seller@example.com", Some("Shop_Cart_WPS"))?;
    let action = paypal_standard::config::SANDBOX_SERVICE_URL;

    let Ok(cert_id) = env::var("PAYPAL_CERT_ID") else {
        eprintln!("PAYPAL_CERT_ID not set; printing the unencrypted button\n");
        render(action, form.form_fields());
        return Ok(());
    };

    let credentials = CredentialConfig { cert_id: Some(cert_id), ..CredentialConfig::default() };

    let sealed = EnvelopeBuilder::new(credentials).seal_form(form.form_fields())?;
    render(action, &sealed);
    Ok(())
}
