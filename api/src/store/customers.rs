use payloads::requests::validate_email;
use payloads::{Customer, CustomerId};
use uuid::Uuid;

use super::{Store, StoreData, StoreError};

impl Store {
    /// Create a customer and a token for them.
    pub fn register(
        &self,
        email: &str,
    ) -> Result<(Customer, String), StoreError> {
        let email = email.trim();
        if let Some(message) = validate_email(email).error_message() {
            return Err(StoreError::InvalidEmail(message));
        }
        let mut data = self.lock();
        if find_customer(&data, email).is_some() {
            return Err(StoreError::EmailTaken);
        }
        let customer = Customer {
            id: CustomerId(Uuid::new_v4()),
            email: email.to_string(),
        };
        data.customers.push(customer.clone());
        let token = issue_token(&mut data, &customer.email);
        Ok((customer, token))
    }

    /// Issue a new token for an existing customer. Earlier tokens stay
    /// valid.
    pub fn login(&self, email: &str) -> Result<(Customer, String), StoreError> {
        let mut data = self.lock();
        let customer = find_customer(&data, email.trim())
            .cloned()
            .ok_or(StoreError::CustomerNotFound)?;
        let token = issue_token(&mut data, &customer.email);
        Ok((customer, token))
    }

    pub fn customer_for_token(
        &self,
        token: &str,
    ) -> Result<Customer, StoreError> {
        let data = self.lock();
        let email = data.tokens.get(token).ok_or(StoreError::InvalidToken)?;
        find_customer(&data, email)
            .cloned()
            .ok_or(StoreError::InvalidToken)
    }
}

fn find_customer<'a>(data: &'a StoreData, email: &str) -> Option<&'a Customer> {
    data.customers
        .iter()
        .find(|customer| customer.email.eq_ignore_ascii_case(email))
}

fn issue_token(data: &mut StoreData, email: &str) -> String {
    let token = Uuid::new_v4().simple().to_string();
    data.tokens.insert(token.clone(), email.to_string());
    token
}
