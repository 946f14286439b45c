use serde::Serialize;

use crate::{entity::confirmed_order, prelude::*, utils};

/// Hands e-mails to an external dispatch service. Delivery is fire and
/// forget: failures are logged and never reach the caller.
#[derive(Clone)]
pub struct Mailer {
  client: reqwest::Client,
  endpoint: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Mail {
  pub to: Vec<String>,
  pub subject: String,
  pub body: String,
}

impl Mail {
  pub fn order_confirmed(
    order: &confirmed_order::Model,
    to: Vec<String>,
  ) -> Self {
    Self {
      to,
      subject: format!("Order {} confirmed", order.order_id),
      body: format!(
        "Order {} for {} placed on {} by {} has been confirmed.\nTotal: {}",
        order.order_id,
        order.pharmacy_name,
        order.order_date,
        order.rep_name,
        utils::format_money(order.total_value)
      ),
    }
  }
}

impl Mailer {
  pub fn new(endpoint: Option<String>) -> Self {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(10))
      .build()
      .unwrap_or_else(|err| {
        warn!("Mail client has no request timeout: {err}");
        reqwest::Client::new()
      });
    Self { client, endpoint }
  }

  pub fn enabled(&self) -> bool {
    self.endpoint.is_some()
  }

  pub fn send(&self, mail: Mail) {
    let Some(endpoint) = self.endpoint.clone() else {
      debug!("Mail '{}' dropped, no dispatch endpoint", mail.subject);
      return;
    };
    if mail.to.is_empty() {
      debug!("Mail '{}' has no recipients", mail.subject);
      return;
    }

    let client = self.client.clone();
    tokio::spawn(async move {
      let result = client
        .post(&endpoint)
        .json(&mail)
        .send()
        .await
        .and_then(|resp| resp.error_for_status());

      match result {
        Ok(_) => info!("Mail '{}' sent to {:?}", mail.subject, mail.to),
        Err(err) => error!("Mail '{}' failed: {}", mail.subject, err),
      }
    });
  }
}
