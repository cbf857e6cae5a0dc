use rust_decimal::Decimal;

use crate::core::format_amount;

/// Domain event produced by a committed unit of work
///
/// Events are collected while the transaction runs and only handed to the
/// notification dispatcher after commit.
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    ContractCreated {
        buyer_id: String,
        contract_number: String,
        device_name: String,
    },
    DeviceSold {
        admin_id: String,
        device_name: String,
        contract_number: String,
    },
    PaymentConfirmed {
        buyer_id: String,
        contract_number: String,
        amount: Decimal,
        remaining_balance: Decimal,
    },
    PaymentRejected {
        buyer_id: String,
        contract_number: String,
        amount: Decimal,
        reason: Option<String>,
    },
}

impl LedgerEvent {
    /// User the notification is addressed to
    pub fn recipient_id(&self) -> &str {
        match self {
            LedgerEvent::ContractCreated { buyer_id, .. }
            | LedgerEvent::PaymentConfirmed { buyer_id, .. }
            | LedgerEvent::PaymentRejected { buyer_id, .. } => buyer_id,
            LedgerEvent::DeviceSold { admin_id, .. } => admin_id,
        }
    }

    pub fn message(&self) -> String {
        match self {
            LedgerEvent::ContractCreated {
                contract_number,
                device_name,
                ..
            } => format!(
                "Contract {} for {} has been created",
                contract_number, device_name
            ),
            LedgerEvent::DeviceSold {
                device_name,
                contract_number,
                ..
            } => format!("{} sold under contract {}", device_name, contract_number),
            LedgerEvent::PaymentConfirmed {
                contract_number,
                amount,
                remaining_balance,
                ..
            } => format!(
                "Payment of {} received for contract {}. Remaining balance: {}",
                format_amount(*amount),
                contract_number,
                format_amount(*remaining_balance)
            ),
            LedgerEvent::PaymentRejected {
                contract_number,
                amount,
                reason,
                ..
            } => match reason {
                Some(reason) => format!(
                    "Payment of {} for contract {} was rejected: {}",
                    format_amount(*amount),
                    contract_number,
                    reason
                ),
                None => format!(
                    "Payment of {} for contract {} was rejected",
                    format_amount(*amount),
                    contract_number
                ),
            },
        }
    }
}
