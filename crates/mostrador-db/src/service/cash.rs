//! # Cash Register Service
//!
//! Register session lifecycle and reconciliation.
//!
//! ## Session State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │   none ──open_register──► open ──close_register──► closed (terminal)    │
//! │                                                                         │
//! │   At most ONE session is open system-wide, enforced twice:              │
//! │   - the open-check inside the insert transaction                        │
//! │   - a partial unique index on cash_registers(status) WHERE 'open'       │
//! │                                                                         │
//! │   expected = opening + Σ(ingreso, venta) − Σ(egreso)                    │
//! │   difference at close = counted − expected (negative = shortfall)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! While a session is open its balance is always recomputed from the full
//! movement ledger; the only stored balances are the ones frozen onto the
//! row at close time.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::repository::cash::{
    generate_cash_movement_id, generate_register_id, CashRegisterRepository,
};
use crate::service::ServiceResult;
use mostrador_core::validation::validate_note;
use mostrador_core::{
    CashMovement, CashMovementKind, CashRegister, LedgerError, Money, RegisterDetail,
    RegisterStatus, RegisterSummary, Sale, ValidationError, CATEGORY_SALE,
    CATEGORY_SUPPLIER_PAYMENT,
};

/// Service managing register sessions and the cash ledger.
#[derive(Debug, Clone)]
pub struct CashRegisterService {
    pool: SqlitePool,
}

impl CashRegisterService {
    /// Creates a new CashRegisterService.
    pub fn new(pool: SqlitePool) -> Self {
        CashRegisterService { pool }
    }

    /// Opens a new register session.
    ///
    /// Fails with [`LedgerError::RegisterAlreadyOpen`] if a session is
    /// already open. When `opening_amount` is omitted it defaults to the
    /// closing amount of the most recently closed session (yesterday's
    /// float carries over), or zero if there is no prior session.
    pub async fn open_register(
        &self,
        opening_amount: Option<Money>,
        note: Option<String>,
    ) -> ServiceResult<CashRegister> {
        if let Some(amount) = opening_amount {
            if amount.is_negative() {
                return Err(LedgerError::InvalidAmount { amount }.into());
            }
        }
        if let Some(note) = &note {
            validate_note("note", note)?;
        }

        let mut tx = self.pool.begin().await?;

        // Check and insert share the transaction; the partial unique index
        // on status='open' backs this up against a concurrent open.
        if let Some(open) = CashRegisterRepository::find_open(&mut *tx).await? {
            return Err(LedgerError::RegisterAlreadyOpen { open_id: open.id }.into());
        }

        let opening_amount = match opening_amount {
            Some(amount) => amount,
            None => CashRegisterRepository::find_last_closed(&mut *tx)
                .await?
                .and_then(|r| r.closing_amount)
                .unwrap_or(Money::ZERO),
        };

        let register = CashRegister {
            id: generate_register_id(),
            status: RegisterStatus::Open,
            opened_at: Utc::now(),
            closed_at: None,
            opening_amount,
            closing_amount: None,
            expected_amount: None,
            difference: None,
            note,
        };
        CashRegisterRepository::insert(&mut *tx, &register).await?;

        tx.commit().await?;

        info!(id = %register.id, opening = %register.opening_amount, "Register opened");
        Ok(register)
    }

    /// Records a manual `ingreso` or `egreso` against an open session.
    ///
    /// `amount` must be positive; the sign is implied by the kind and
    /// applied only when computing balances. `venta` entries are reserved
    /// for the sale path and rejected here.
    ///
    /// Supplier payments arrive through this operation with
    /// `category = "pago_proveedor"` and the payment id as reference.
    pub async fn record_movement(
        &self,
        register_id: &str,
        kind: CashMovementKind,
        amount: Money,
        description: String,
        category: String,
        reference_id: Option<String>,
    ) -> ServiceResult<CashMovement> {
        if kind == CashMovementKind::Venta {
            return Err(ValidationError::NotAllowed {
                field: "kind".to_string(),
                allowed: vec!["ingreso".to_string(), "egreso".to_string()],
            }
            .into());
        }
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount }.into());
        }
        validate_note("description", &description)?;

        let register = CashRegisterRepository::fetch_by_id(&self.pool, register_id)
            .await?
            .ok_or_else(|| LedgerError::RegisterNotFound(register_id.to_string()))?;
        if !register.is_open() {
            return Err(LedgerError::RegisterNotOpen(register_id.to_string()).into());
        }

        let movement = CashMovement {
            id: generate_cash_movement_id(),
            cash_register_id: register.id,
            kind,
            amount,
            description,
            category,
            reference_id,
            created_at: Utc::now(),
        };
        CashRegisterRepository::insert_movement(&self.pool, &movement).await?;

        info!(
            register_id = %register_id,
            kind = %kind,
            amount = %amount,
            category = %movement.category,
            "Cash movement recorded"
        );
        Ok(movement)
    }

    /// Records a supplier payment as an `egreso`.
    pub async fn record_supplier_payment(
        &self,
        register_id: &str,
        amount: Money,
        supplier_name: &str,
        reference_id: Option<String>,
    ) -> ServiceResult<CashMovement> {
        self.record_movement(
            register_id,
            CashMovementKind::Egreso,
            amount,
            format!("Pago a proveedor {supplier_name}"),
            CATEGORY_SUPPLIER_PAYMENT.to_string(),
            reference_id,
        )
        .await
    }

    /// The session's expected balance.
    ///
    /// Open sessions: recomputed from the full movement ledger on every
    /// call. Closed sessions: the value frozen at close time.
    pub async fn expected(&self, register_id: &str) -> ServiceResult<Money> {
        let register = CashRegisterRepository::fetch_by_id(&self.pool, register_id)
            .await?
            .ok_or_else(|| LedgerError::RegisterNotFound(register_id.to_string()))?;

        if let Some(frozen) = register.expected_amount {
            return Ok(frozen);
        }

        let totals = CashRegisterRepository::ledger_totals(&self.pool, register_id).await?;
        Ok(register.opening_amount + totals.net())
    }

    /// Closes an open session with the physically counted amount.
    ///
    /// `expected` is recomputed inside the closing transaction, so a cash
    /// movement landing between a stale read and the close cannot be lost
    /// from the frozen balance. `difference = closing − expected`;
    /// negative means the drawer came up short.
    pub async fn close_register(
        &self,
        register_id: &str,
        closing_amount: Money,
        note: Option<String>,
    ) -> ServiceResult<CashRegister> {
        // A counted drawer of exactly zero is a legitimate close.
        if closing_amount.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: closing_amount,
            }
            .into());
        }
        if let Some(note) = &note {
            validate_note("note", note)?;
        }

        let mut tx = self.pool.begin().await?;

        let register = CashRegisterRepository::fetch_by_id(&mut *tx, register_id)
            .await?
            .ok_or_else(|| LedgerError::RegisterNotFound(register_id.to_string()))?;
        if register.status == RegisterStatus::Closed {
            return Err(LedgerError::RegisterAlreadyClosed(register_id.to_string()).into());
        }

        let totals = CashRegisterRepository::ledger_totals(&mut *tx, register_id).await?;
        let expected_amount = register.opening_amount + totals.net();
        let difference = closing_amount - expected_amount;
        let closed_at = Utc::now();

        CashRegisterRepository::close(
            &mut *tx,
            register_id,
            closing_amount,
            expected_amount,
            difference,
            closed_at,
            note.as_deref(),
        )
        .await?;

        tx.commit().await?;

        info!(
            register_id = %register_id,
            expected = %expected_amount,
            counted = %closing_amount,
            difference = %difference,
            "Register closed"
        );

        let mut closed = register;
        closed.status = RegisterStatus::Closed;
        closed.closed_at = Some(closed_at);
        closed.closing_amount = Some(closing_amount);
        closed.expected_amount = Some(expected_amount);
        closed.difference = Some(difference);
        if note.is_some() {
            closed.note = note;
        }
        Ok(closed)
    }

    /// The session with its movements and live expected balance.
    pub async fn detail(&self, register_id: &str) -> ServiceResult<RegisterDetail> {
        let register = CashRegisterRepository::fetch_by_id(&self.pool, register_id)
            .await?
            .ok_or_else(|| LedgerError::RegisterNotFound(register_id.to_string()))?;
        let movements =
            CashRegisterRepository::fetch_movements(&self.pool, register_id).await?;
        let expected_amount = self.expected(register_id).await?;

        Ok(RegisterDetail {
            register,
            movements,
            expected_amount,
        })
    }

    /// Close-of-day totals for a session.
    pub async fn summary(&self, register_id: &str) -> ServiceResult<RegisterSummary> {
        let register = CashRegisterRepository::fetch_by_id(&self.pool, register_id)
            .await?
            .ok_or_else(|| LedgerError::RegisterNotFound(register_id.to_string()))?;

        let totals = CashRegisterRepository::ledger_totals(&self.pool, register_id).await?;
        let expected_amount = register
            .expected_amount
            .unwrap_or(register.opening_amount + totals.net());

        Ok(RegisterSummary {
            register,
            expected_amount,
            total_ventas: totals.ventas,
            num_ventas: totals.num_ventas,
            total_ingresos: totals.ingresos,
            total_egresos: totals.egresos,
        })
    }

    // =========================================================================
    // Sale integration
    // =========================================================================

    /// Posts the cash movement for a committed sale.
    ///
    /// Called by the sale service only, after its own transaction commits.
    /// Returns `Ok(None)` when there is nothing to post: no open session,
    /// or a zero-total sale. The open session is re-read here rather than
    /// trusted from the sale's transaction; the register may have closed in
    /// between.
    pub(crate) async fn post_sale(&self, sale: &Sale) -> ServiceResult<Option<CashMovement>> {
        let Some(register) = CashRegisterRepository::find_open(&self.pool).await? else {
            return Ok(None);
        };
        if !sale.grand_total.is_positive() {
            debug!(sale_id = %sale.id, "Zero-total sale; no cash movement");
            return Ok(None);
        }

        let movement = CashMovement {
            id: generate_cash_movement_id(),
            cash_register_id: register.id,
            kind: CashMovementKind::Venta,
            amount: sale.grand_total,
            description: format!("Venta {}", sale.number),
            category: CATEGORY_SALE.to_string(),
            reference_id: Some(sale.id.clone()),
            created_at: Utc::now(),
        };
        CashRegisterRepository::insert_movement(&self.pool, &movement).await?;

        Ok(Some(movement))
    }
}
