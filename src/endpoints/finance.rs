//! Department ledger.

use deptportal_api_types::finance::{CreateTransactionRequest, FinanceSummary, Transaction};
use deptportal_api_types::{IdArg, ListQuery, NoArgs};
use serde_json::Value;

use crate::cache::{Tag, TagType};
use crate::endpoint::{MutationEndpoint, QueryEndpoint, RegistryBuilder, TagSpec};
use crate::transport::{ApiError, ApiRequest};

use super::{list_tags, segment};

/// Any ledger change moves the aggregates too.
const LEDGER: &[TagType] = &[TagType::Transaction, TagType::FinanceSummary];

pub const GET_TRANSACTIONS: QueryEndpoint<ListQuery, Vec<Transaction>> =
    QueryEndpoint::new("getTransactions", transactions, TagSpec::Compute(transaction_tags));

pub const GET_FINANCE_SUMMARY: QueryEndpoint<NoArgs, FinanceSummary> = QueryEndpoint::new(
    "getFinanceSummary",
    summary,
    TagSpec::Types(&[TagType::FinanceSummary]),
);

pub const CREATE_TRANSACTION: MutationEndpoint<CreateTransactionRequest, Transaction> =
    MutationEndpoint::new("createTransaction", create_transaction, TagSpec::Types(LEDGER));

pub const DELETE_TRANSACTION: MutationEndpoint<IdArg, Value> =
    MutationEndpoint::new("deleteTransaction", delete_transaction, TagSpec::Types(LEDGER));

pub(crate) fn declare(registry: &mut RegistryBuilder) {
    registry.declare(GET_TRANSACTIONS.definition());
    registry.declare(GET_FINANCE_SUMMARY.definition());
    registry.declare(CREATE_TRANSACTION.definition());
    registry.declare(DELETE_TRANSACTION.definition());
}

fn transactions(args: &ListQuery) -> Result<ApiRequest, ApiError> {
    ApiRequest::get("finance/transactions").query(args)
}

fn transaction_tags(_: &ListQuery, transactions: Option<&Vec<Transaction>>) -> Vec<Tag> {
    list_tags(TagType::Transaction, transactions, |transaction| {
        transaction.id.as_str()
    })
}

fn summary(_: &NoArgs) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::get("finance/summary"))
}

fn create_transaction(args: &CreateTransactionRequest) -> Result<ApiRequest, ApiError> {
    if args.amount <= 0 {
        return Err(ApiError::request("amount must be positive"));
    }
    ApiRequest::post("finance/transactions").json(args)
}

fn delete_transaction(args: &IdArg) -> Result<ApiRequest, ApiError> {
    Ok(ApiRequest::delete(format!(
        "finance/transactions/{}",
        segment(&args.id)?
    )))
}
