use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::catalog::pricing::format_minor_units;
use crate::domain::plan::{CheckoutPriceId, Plan, PlanId};

pub const DEFAULT_LOCALE: &str = "en";

/// Locales the processor serves under their own path segment.
const LOCALIZED_CHECKOUT_LOCALES: &[&str] = &["zh"];

/// Placeholders the affiliate network substitutes on redirect.
const AFFILIATE_PARAMS: &str =
    "aff_transaction_id={transaction_id}&aff_offer_id={offer_id}&aff_id={aff_id}";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("plan `{plan_id}` has no checkout price identifier")]
    MissingPriceIdentifier { plan_id: PlanId },
}

impl CheckoutError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::MissingPriceIdentifier { .. } => {
                "No plan identifier is available for this plan. Please choose a plan again."
            }
        }
    }

    /// Where the shopper goes to pick another plan.
    pub fn return_path(&self, locale: &str) -> String {
        match normalize_locale(locale) {
            Some(locale) => format!("/{locale}"),
            None => "/".to_string(),
        }
    }
}

/// Lowercased locale, or `None` for the default locale.
fn normalize_locale(locale: &str) -> Option<String> {
    let locale = locale.trim().to_ascii_lowercase();
    if locale.is_empty() || locale == DEFAULT_LOCALE {
        None
    } else {
        Some(locale)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRedirect {
    pub plan_id: PlanId,
    pub price_id: CheckoutPriceId,
    pub redirect_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSummary {
    pub plan_id: PlanId,
    pub name: String,
    pub data: String,
    pub validity: String,
    pub price: String,
    pub is_unlimited: bool,
}

impl CheckoutSummary {
    pub fn for_plan(plan: &Plan) -> Self {
        Self {
            plan_id: plan.id.clone(),
            name: plan.name.clone(),
            data: if plan.is_unlimited { "Unlimited".to_string() } else { plan.data.clone() },
            validity: plan.validity.clone(),
            price: format_minor_units(plan.price.amount_with_tax, &plan.price.currency),
            is_unlimited: plan.is_unlimited,
        }
    }
}

/// Builds processor checkout URLs. Only a [`CheckoutPriceId`] can reach the
/// URL; plan ids are never accepted here.
#[derive(Clone, Debug)]
pub struct CheckoutLinkBuilder {
    checkout_base_url: Url,
    affiliate_base_url: Option<Url>,
}

impl CheckoutLinkBuilder {
    pub fn new(checkout_base_url: Url, affiliate_base_url: Option<Url>) -> Self {
        Self { checkout_base_url, affiliate_base_url }
    }

    pub fn checkout_url(&self, price_id: &CheckoutPriceId, locale: &str) -> String {
        let root = self.checkout_base_url.as_str().trim_end_matches('/');
        let segment = match normalize_locale(locale) {
            Some(locale) if LOCALIZED_CHECKOUT_LOCALES.contains(&locale.as_str()) => {
                format!("{locale}/checkout/")
            }
            _ => "checkout/".to_string(),
        };
        let plan_id: String =
            url::form_urlencoded::byte_serialize(price_id.as_str().as_bytes()).collect();

        format!("{root}/{segment}?planId={plan_id}&{AFFILIATE_PARAMS}")
    }

    /// Processor URL wrapped in the affiliate tracking link when one is
    /// configured. The inner URL travels percent-encoded in `url`.
    pub fn redirect_url(&self, price_id: &CheckoutPriceId, locale: &str) -> String {
        let checkout_url = self.checkout_url(price_id, locale);
        match &self.affiliate_base_url {
            Some(affiliate) => {
                let mut wrapped = affiliate.clone();
                wrapped.query_pairs_mut().append_pair("url", &checkout_url);
                wrapped.to_string()
            }
            None => checkout_url,
        }
    }

    pub fn prepare_checkout(
        &self,
        plan: &Plan,
        locale: &str,
    ) -> Result<CheckoutRedirect, CheckoutError> {
        let Some(price_id) =
            plan.price.identifier.as_ref().and_then(|id| CheckoutPriceId::new(id.as_str()))
        else {
            warn!(
                event_name = "checkout.price_identifier.missing",
                plan_id = %plan.id,
                "plan cannot be sent to checkout without a price identifier"
            );
            return Err(CheckoutError::MissingPriceIdentifier { plan_id: plan.id.clone() });
        };

        let redirect_url = self.redirect_url(&price_id, locale);
        info!(
            event_name = "checkout.redirect.prepared",
            plan_id = %plan.id,
            locale,
            "checkout redirect prepared"
        );

        Ok(CheckoutRedirect { plan_id: plan.id.clone(), price_id, redirect_url })
    }
}
