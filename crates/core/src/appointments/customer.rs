use serde_json::{Map, Value};

use crate::item::{AttributeValue, Item};

/// The storefront customer attached to a request by the gateway authorizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Customer {
    pub customer_id: Option<String>,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub shop_domain: String,
}

impl Customer {
    /// Reads the authorizer context. Non-string values are stringified and missing
    /// names default to empty text.
    pub fn from_authorizer(context: &Map<String, Value>) -> Self {
        Self {
            customer_id: text(context, "shopifyCustomerId"),
            email: text(context, "email"),
            first_name: text(context, "firstName").unwrap_or_default(),
            last_name: text(context, "lastName").unwrap_or_default(),
            phone: text(context, "phone").unwrap_or_default(),
            shop_domain: text(context, "shopDomain").unwrap_or_default(),
        }
    }

    pub fn phone(&self) -> Option<&str> {
        Some(self.phone.as_str()).filter(|phone| !phone.trim().is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.trim().is_empty())
    }

    /// Whether the customer can be identified by phone or email.
    pub fn has_contact(&self) -> bool {
        self.phone().is_some() || self.email().is_some()
    }

    /// Attributes stored on the customer's profile. An unknown email is left out.
    pub fn profile_attributes(&self) -> Item {
        let mut item = Item::new();
        if let Some(email) = &self.email {
            item.insert("email".to_string(), AttributeValue::from(email.as_str()));
        }
        item.insert("shopDomain".to_string(), AttributeValue::from(self.shop_domain.as_str()));
        item.insert("firstName".to_string(), AttributeValue::from(self.first_name.as_str()));
        item.insert("lastName".to_string(), AttributeValue::from(self.last_name.as_str()));
        item.insert("phone".to_string(), AttributeValue::from(self.phone.as_str()));
        item
    }
}

fn text(context: &Map<String, Value>, name: &str) -> Option<String> {
    match context.get(name)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}
