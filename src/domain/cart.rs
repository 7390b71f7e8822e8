use super::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: i32,
    pub quantity: i32,
}

/// Rejects non-positive quantities and merges repeated products.
pub fn normalize_cart(items: Vec<CartItem>) -> Result<Vec<CartItem>, DomainError> {
    let mut merged: Vec<CartItem> = Vec::with_capacity(items.len());
    for item in items {
        if item.quantity <= 0 {
            return Err(DomainError::InvalidInput(format!(
                "quantity for product {} must be positive",
                item.product_id
            )));
        }
        match merged.iter_mut().find(|m| m.product_id == item.product_id) {
            Some(existing) => {
                existing.quantity =
                    existing.quantity.checked_add(item.quantity).ok_or_else(|| {
                        DomainError::InvalidInput(format!(
                            "quantity for product {} is too large",
                            item.product_id
                        ))
                    })?;
            }
            None => merged.push(item),
        }
    }
    Ok(merged)
}
