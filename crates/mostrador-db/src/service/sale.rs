//! # Sale Transaction Service
//!
//! Orchestrates sale creation and reversal across the stock ledger and the
//! cash register.
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  createSale                                                             │
//! │                                                                         │
//! │  ┌── one transaction ───────────────────────────────────────────────┐   │
//! │  │ 1. find open register session (linkage only)                     │   │
//! │  │ 2. snapshot every product (consistent pre-sale view, NotFound    │   │
//! │  │    before any write)                                             │   │
//! │  │ 3. grand total = caller override, else Σ(price × quantity)       │   │
//! │  │ 4. insert header + items                                         │   │
//! │  │ 5. one venta movement per line: -(quantity × size)               │   │
//! │  └──────────────────────────────────────────────────── commit ──────┘   │
//! │                                                                         │
//! │  6. BEST-EFFORT, outside the transaction:                               │
//! │     efectivo + open session ⇒ post venta cash movement                  │
//! │     failure is logged and swallowed - the sale stands                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The reversal is the mirror image minus the cash leg: devolucion
//! movements restore stock, the header delete cascades the items, and the
//! already-posted cash movement is deliberately left in the register's
//! history.
//!
//! Neither operation is idempotent; callers must confirm the outcome of a
//! failed attempt before retrying.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::repository::sale::{
    generate_sale_id, generate_sale_item_id, SaleFilter, SaleRepository,
};
use crate::repository::cash::CashRegisterRepository;
use crate::service::cash::CashRegisterService;
use crate::service::stock::StockLedgerService;
use crate::service::ServiceResult;
use mostrador_core::validation::validate_sale_lines;
use mostrador_core::{
    LedgerError, MovementKind, NewSale, Sale, SaleItem, SaleWithItems,
};

/// Service orchestrating sale creation and reversal.
#[derive(Debug, Clone)]
pub struct SaleService {
    pool: SqlitePool,
}

impl SaleService {
    /// Creates a new SaleService.
    pub fn new(pool: SqlitePool) -> Self {
        SaleService { pool }
    }

    /// Records a sale as one atomic unit: header, items and per-line stock
    /// decrements all commit together.
    ///
    /// The cash posting that follows the commit is best-effort; see the
    /// module docs.
    pub async fn create_sale(&self, new_sale: NewSale) -> ServiceResult<SaleWithItems> {
        if new_sale.items.is_empty() {
            return Err(LedgerError::EmptySale.into());
        }
        validate_sale_lines(&new_sale)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Session open at sale time, recorded on the header for history.
        let open_register = CashRegisterRepository::find_open(&mut *tx).await?;

        // Pre-sale snapshot: every product is read before the first write,
        // so all deltas come from one consistent view and an unknown
        // product aborts the sale before it exists.
        let mut products = Vec::with_capacity(new_sale.items.len());
        for line in &new_sale.items {
            let product = crate::repository::product::ProductRepository::fetch_by_id(
                &mut *tx,
                &line.product_id,
            )
            .await?
            .ok_or_else(|| LedgerError::ProductNotFound(line.product_id.clone()))?;
            products.push(product);
        }

        let grand_total = new_sale
            .grand_total
            .unwrap_or_else(|| new_sale.computed_total());

        let sale = Sale {
            id: generate_sale_id(),
            number: generate_sale_number(now),
            grand_total,
            payment_method: new_sale.payment_method,
            employee_id: new_sale.employee_id.clone(),
            employee_name: new_sale.employee_name.clone(),
            cash_register_id: open_register.as_ref().map(|r| r.id.clone()),
            created_at: now,
        };
        SaleRepository::insert_sale(&mut *tx, &sale).await?;

        let mut items = Vec::with_capacity(new_sale.items.len());
        for (line, product) in new_sale.items.iter().zip(&products) {
            let item = SaleItem {
                id: generate_sale_item_id(),
                sale_id: sale.id.clone(),
                product_id: Some(product.id.clone()),
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                size: line.size,
                created_at: now,
            };
            SaleRepository::insert_item(&mut *tx, &item).await?;

            StockLedgerService::apply_on(
                &mut tx,
                &product.id,
                MovementKind::Venta,
                -line.stock_delta(),
                Some(format!("Venta {}", sale.number)),
                Some(sale.id.clone()),
                now,
            )
            .await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            number = %sale.number,
            total = %grand_total,
            items = items.len(),
            "Sale created"
        );

        // Best-effort cash leg: a register outage must never block a sale.
        if sale.payment_method.is_cash() {
            match CashRegisterService::new(self.pool.clone())
                .post_sale(&sale)
                .await
            {
                Ok(Some(movement)) => {
                    debug!(sale_id = %sale.id, movement_id = %movement.id, "Cash movement posted")
                }
                Ok(None) => debug!(sale_id = %sale.id, "No open register; cash posting skipped"),
                Err(err) => {
                    warn!(sale_id = %sale.id, error = %err, "Cash posting failed; sale kept")
                }
            }
        }

        Ok(SaleWithItems { sale, items })
    }

    /// Reverses a sale: restores stock with compensating `devolucion`
    /// movements and deletes the sale (items cascade).
    ///
    /// One transaction - a partial failure leaves neither restored stock
    /// with a lingering sale nor a deleted sale with unrestored stock.
    /// Cash movements already posted for this sale are kept as history.
    pub async fn reverse_sale(&self, sale_id: &str) -> ServiceResult<()> {
        let mut tx = self.pool.begin().await?;

        let sale = SaleRepository::fetch_by_id(&mut *tx, sale_id)
            .await?
            .ok_or_else(|| LedgerError::SaleNotFound(sale_id.to_string()))?;
        let items = SaleRepository::fetch_items(&mut *tx, sale_id).await?;

        let now = Utc::now();
        let mut restocked = 0usize;
        for item in &items {
            // A NULL product_id means the product was deleted since the
            // sale; there is nothing left to restock.
            let Some(product_id) = &item.product_id else {
                continue;
            };

            StockLedgerService::apply_on(
                &mut tx,
                product_id,
                MovementKind::Devolucion,
                item.stock_delta(),
                Some(format!("Devolución por venta eliminada {}", sale.number)),
                Some(sale.id.clone()),
                now,
            )
            .await?;
            restocked += 1;
        }

        SaleRepository::delete(&mut *tx, sale_id).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            number = %sale.number,
            restocked_lines = restocked,
            "Sale reversed"
        );
        Ok(())
    }

    /// Gets a sale with its items.
    pub async fn get_sale(&self, sale_id: &str) -> ServiceResult<SaleWithItems> {
        let repo = SaleRepository::new(self.pool.clone());
        let sale = repo
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| LedgerError::SaleNotFound(sale_id.to_string()))?;
        let items = repo.get_items(sale_id).await?;
        Ok(SaleWithItems { sale, items })
    }

    /// Lists sales matching the filter, newest first.
    pub async fn list_sales(&self, filter: &SaleFilter) -> ServiceResult<Vec<Sale>> {
        let sales = SaleRepository::new(self.pool.clone()).list(filter).await?;
        Ok(sales)
    }
}

/// Generates a receipt number in format: V-YYMMDD-HHMMSS-NNNN
///
/// The trailing sequence comes from the subsecond clock, enough to keep
/// numbers unique across the terminals a single shop runs.
fn generate_sale_number(now: DateTime<Utc>) -> String {
    let nanos = now.timestamp_subsec_nanos();
    let seq = (nanos % 10_000) as u16;
    format!("V-{}-{:04}", now.format("%y%m%d-%H%M%S"), seq)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_number_format() {
        let now = Utc::now();
        let number = generate_sale_number(now);
        assert!(number.starts_with("V-"));
        // V-YYMMDD-HHMMSS-NNNN
        assert_eq!(number.len(), 2 + 13 + 5);
    }
}
