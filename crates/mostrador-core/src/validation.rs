//! # Validation Module
//!
//! Input shape checks that run before the services touch the store.
//!
//! Validation here covers form, not business rules: a `reposicion` with a
//! negative quantity is a business rule violation and is rejected by the
//! stock ledger service with `InvalidQuantity`, not here. These helpers only
//! reject input that no operation could accept (empty names, negative
//! prices, zero-quantity sale lines).

use crate::error::ValidationError;
use crate::types::{NewProduct, NewSale};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a product name.
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a free-text note or description.
pub const MAX_NOTE_LEN: usize = 500;

/// Validates a product name.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates an optional note / description field.
pub fn validate_note(field: &str, note: &str) -> ValidationResult<()> {
    if note.len() > MAX_NOTE_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NOTE_LEN,
        });
    }
    Ok(())
}

/// Validates a new product before registration.
///
/// ## Rules
/// - name: required, bounded length
/// - unit: required
/// - cost: not negative
/// - initial_stock: not negative (zero skips the `inicial` movement)
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_name(&product.name)?;

    if product.unit.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "unit".to_string(),
        });
    }

    if product.cost.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "cost".to_string(),
        });
    }

    if product.initial_stock.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: "initial_stock".to_string(),
        });
    }

    Ok(())
}

/// Validates the lines of a new sale.
///
/// ## Rules
/// - every line quantity must be positive
/// - every line size must be positive
/// - unit prices must not be negative (zero is a giveaway, allowed)
///
/// The no-lines case is a business rule (`LedgerError::EmptySale`) checked
/// by the sale service, since an empty sale is a domain-level refusal, not
/// a malformed field.
pub fn validate_sale_lines(sale: &NewSale) -> ValidationResult<()> {
    for line in &sale.items {
        if !line.quantity.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            });
        }
        if !line.size.is_positive() {
            return Err(ValidationError::MustBePositive {
                field: "size".to_string(),
            });
        }
        if line.unit_price.is_negative() {
            return Err(ValidationError::MustNotBeNegative {
                field: "unit_price".to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use crate::quantity::Quantity;
    use crate::types::{NewSaleLine, PaymentMethod};

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Arroz 1kg").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(201)).is_err());
    }

    #[test]
    fn test_validate_new_product() {
        let mut p = NewProduct {
            name: "Aceite".to_string(),
            unit: "litro".to_string(),
            cost: Money::from_cents(350),
            initial_stock: Quantity::from_units(10),
        };
        assert!(validate_new_product(&p).is_ok());

        p.initial_stock = Quantity::from_millis(-1);
        assert!(validate_new_product(&p).is_err());

        p.initial_stock = Quantity::ZERO;
        p.unit = "".to_string();
        assert!(validate_new_product(&p).is_err());
    }

    #[test]
    fn test_validate_sale_lines() {
        let good = NewSale::new(
            vec![NewSaleLine::new(
                "p1",
                Quantity::from_units(1),
                Money::from_cents(100),
            )],
            PaymentMethod::Efectivo,
        );
        assert!(validate_sale_lines(&good).is_ok());

        let zero_qty = NewSale::new(
            vec![NewSaleLine::new("p1", Quantity::ZERO, Money::from_cents(100))],
            PaymentMethod::Efectivo,
        );
        assert!(validate_sale_lines(&zero_qty).is_err());

        let bad_size = NewSale::new(
            vec![
                NewSaleLine::new("p1", Quantity::from_units(1), Money::from_cents(100))
                    .with_size(Quantity::ZERO),
            ],
            PaymentMethod::Efectivo,
        );
        assert!(validate_sale_lines(&bad_size).is_err());
    }
}
