//! HTML bodies for the two join notifications. Applicant-supplied text is
//! always escaped before it is interpolated.

use std::fmt::Write;

use crate::config::BankTransferConfig;
use crate::models::{JoinApplication, PaymentResult, Tier};

const WRAPPER_OPEN: &str = r#"<html><body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;"><div style="max-width: 600px; margin: 0 auto; padding: 20px;">"#;
const WRAPPER_CLOSE: &str = "</div></body></html>";
const PANEL: &str = r#"<div style="background-color: #f9f9f9; padding: 20px; border-radius: 10px; margin: 20px 0;">"#;
const PAYMENT_PANEL: &str = r#"<div style="background-color: #f0f9ff; padding: 20px; border-radius: 10px; margin: 20px 0; border-left: 4px solid #3b82f6;">"#;
const CONTACT_ADDRESS: &str = "contact@herscape.org";

/// What the two messages say about money.
#[derive(Debug, Clone, Copy)]
pub enum PaymentCopy<'a> {
    Paid(&'a PaymentResult),
    Deferred(&'a BankTransferConfig),
}

pub fn admin_subject(app: &JoinApplication, tier: &Tier, copy: PaymentCopy<'_>) -> String {
    match copy {
        PaymentCopy::Paid(_) => format!(
            "New Founding Circle Member: {} - {} (paid {})",
            app.full_name(),
            tier.name,
            tier.price_string
        ),
        PaymentCopy::Deferred(_) => format!(
            "New Founding Circle Application: {} - {}",
            app.full_name(),
            tier.name
        ),
    }
}

pub fn applicant_subject(copy: PaymentCopy<'_>) -> String {
    match copy {
        PaymentCopy::Paid(_) => "Welcome to the Herscape Founding Circle - Membership Active".into(),
        PaymentCopy::Deferred(_) => "Your Herscape Founding Circle Application".into(),
    }
}

pub fn admin_body(app: &JoinApplication, tier: &Tier, copy: PaymentCopy<'_>) -> String {
    let mut html = String::from(WRAPPER_OPEN);
    html.push_str(r#"<h1 style="color: #bdda57; border-bottom: 2px solid #bdda57; padding-bottom: 10px;">New Founding Circle Application</h1>"#);

    html.push_str(PANEL);
    html.push_str("<h2>Applicant Information</h2>");
    detail(&mut html, "Name", &app.full_name());
    detail(&mut html, "Email", &app.email);
    detail(&mut html, "Phone", &app.phone);
    detail(&mut html, "Membership Tier", tier.name);
    if let Some(company) = &app.company {
        detail(&mut html, "Company", company);
    }
    if let Some(linkedin) = &app.linkedin {
        let link = escape_html(linkedin);
        let _ = write!(
            html,
            "<p><strong>LinkedIn:</strong> <a href=\"{link}\" target=\"_blank\">{link}</a></p>"
        );
    }
    if let Some(country) = &app.country {
        detail(&mut html, "Country", country);
    }
    html.push_str("</div>");

    if let Some(message) = &app.message {
        let _ = write!(
            html,
            "{PANEL}<h3>Why they want to join Herscape:</h3><p style=\"white-space: pre-wrap;\">{}</p></div>",
            escape_html(message)
        );
    }

    html.push_str(PAYMENT_PANEL);
    match copy {
        PaymentCopy::Paid(payment) => {
            html.push_str("<h3>Payment Received</h3>");
            detail(&mut html, "Amount Paid", &tier.price_string);
            detail(&mut html, "PayPal Order", &payment.order_id);
            html.push_str("<p><strong>Status:</strong> Membership active immediately.</p>");
        }
        PaymentCopy::Deferred(bank) => {
            html.push_str("<h3>Payment Instructions for Applicant</h3>");
            detail(&mut html, "Amount Owed", &tier.price_string);
            bank_details(&mut html, bank);
            html.push_str("<p><strong>Status:</strong> Awaiting bank transfer before activation.</p>");
        }
    }
    html.push_str("</div>");

    html.push_str(r#"<div style="margin-top: 30px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 12px; color: #666;"><p>This application was submitted through the Herscape website.</p><p>Reply to this email to respond directly to the applicant.</p></div>"#);
    html.push_str(WRAPPER_CLOSE);
    html
}

pub fn applicant_body(app: &JoinApplication, tier: &Tier, copy: PaymentCopy<'_>) -> String {
    let mut html = String::from(WRAPPER_OPEN);
    html.push_str(r#"<div style="text-align: center; margin-bottom: 30px;"><h1 style="color: #bdda57;">Welcome to Herscape!</h1></div>"#);
    let _ = write!(html, "<p>Hi {},</p>", escape_html(&app.first_name));

    html.push_str(PANEL);
    html.push_str("<h2>Application Details</h2>");
    detail(&mut html, "Name", &app.full_name());
    detail(&mut html, "Email", &app.email);
    detail(&mut html, "Membership Tier", tier.name);

    match copy {
        PaymentCopy::Paid(_) => {
            detail(&mut html, "Amount Paid", &tier.price_string);
            detail(&mut html, "Status", "Membership active");
            html.push_str("</div>");
            let _ = write!(
                html,
                "<p>Thank you for your payment. Your <strong>{}</strong> membership is active immediately.</p>",
                tier.name
            );
            html.push_str("<p>We'll be in touch soon with your exclusive member benefits and upcoming events.</p>");
        }
        PaymentCopy::Deferred(bank) => {
            detail(&mut html, "Payment Amount", &tier.price_string);
            html.push_str("</div>");
            html.push_str("<p>To complete your membership and join the Herscape Founding Circle, please complete the payment using the details below.</p>");
            html.push_str(PAYMENT_PANEL);
            html.push_str("<h3>Payment Instructions</h3>");
            detail(&mut html, "Amount to Send", &tier.price_string);
            bank_details(&mut html, bank);
            html.push_str("</div>");
            html.push_str("<p><strong>Important:</strong> Please include your name in the payment memo/reference so we can properly track your payment.</p>");
            html.push_str("<ul><li>We'll review your application within 24-48 hours</li><li>Once payment is received, we'll confirm and activate your membership</li><li>You'll receive access to exclusive Founding Circle benefits</li></ul>");
        }
    }

    let _ = write!(
        html,
        "<p style=\"color: #666; font-size: 12px;\">If you have any questions, reply to this email or contact us at {CONTACT_ADDRESS}.</p><p>The Herscape Team</p>"
    );
    html.push_str(WRAPPER_CLOSE);
    html
}

fn bank_details(html: &mut String, bank: &BankTransferConfig) {
    if !bank.is_configured() {
        html.push_str("<p>Our team will reply with bank transfer details shortly.</p>");
        return;
    }
    for (label, value) in [
        ("Account Holder", &bank.account_holder),
        ("Bank", &bank.bank_name),
        ("Account Number", &bank.account_number),
        ("Routing Number", &bank.routing_number),
        ("Account Type", &bank.account_type),
        ("Address", &bank.address),
    ] {
        if !value.trim().is_empty() {
            detail(html, label, value);
        }
    }
}

fn detail(html: &mut String, label: &str, value: &str) {
    let _ = write!(
        html,
        "<p><strong>{label}:</strong> {}</p>",
        escape_html(value)
    );
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
