//! The MCP tools. Each tool validates that the service was initialized and then calls the command
//! handler of the same name.

use crate::args::{
    AddSavingArgs, AddTransactionArgs, BillIdArgs, DashboardArgs, DeleteTransactionArgs,
    ListTransactionsArgs, SaveBillArgs, SavingIdArgs, SavingTransferArgs, SetBudgetArgs,
    UpdateSavingArgs,
};
use crate::commands;
use crate::mcp::mcp_utils::tool_result;
use crate::mcp::PersonyServer;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use rmcp::{tool, tool_router};
use tracing::info;

#[tool_router(vis = "pub(super)")]
impl PersonyServer {
    #[tool]
    /// Initialize the persony MCP service for this session and return usage instructions. You
    /// **MUST** call this **ONCE** before using other tools so that you have the full usage
    /// instructions. You **MAY** call it more than once if you have forgotten the usage
    /// instructions.
    async fn initialize_service(&self) -> Result<CallToolResult, McpError> {
        let mut initialized = self.initialized.lock().await;
        *initialized = true;
        Ok(CallToolResult::success(vec![rmcp::model::Content::text(
            include_str!("docs/INSTRUCTIONS.md"),
        )]))
    }

    /// Show the dashboard: the user's name, current balance, income and expense totals over the
    /// chosen `range` (day, week, month, year or all; default all), the total held in saving
    /// plans, the donut chart breakdown of income / expense / savings, today's budget status, the
    /// five most recent transactions and the bills that are due.
    #[tool]
    async fn dashboard(
        &self,
        Parameters(args): Parameters<DashboardArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        info!("MCP: dashboard called with range={}", args.range);
        tool_result(commands::dashboard(self.config(), args).await)
    }

    /// Record an income or an expense. The amount is whole Rupiah and must be positive; `kind` is
    /// `income` or `expense` (default). The date defaults to today. The balance is adjusted in the
    /// same step. When an expense brings today's spending to the daily budget the result includes
    /// a `budget_alert` that you should tell the user about.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "title": "Lunch",
    ///   "amount": 35000,
    ///   "kind": "expense",
    ///   "date": "2025-03-01"
    /// }
    /// ```
    #[tool]
    async fn add_transaction(
        &self,
        Parameters(args): Parameters<AddTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::add_transaction(self.config(), args).await)
    }

    /// Delete a transaction by its numeric ID. Its effect on the balance is reversed.
    #[tool]
    async fn delete_transaction(
        &self,
        Parameters(args): Parameters<DeleteTransactionArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_transaction(self.config(), args).await)
    }

    /// List transactions newest first, optionally within a `range` (day, week, month, year or
    /// all) and limited to `limit` entries.
    #[tool]
    async fn list_transactions(
        &self,
        Parameters(args): Parameters<ListTransactionsArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::list_transactions(self.config(), args).await)
    }

    /// Add a bill, or replace an existing bill by passing its `id`. `recurrence` is one of
    /// `once` (default), `weekly`, `monthly` or `yearly`. Saving a bill does not change the
    /// balance.
    ///
    /// # Example
    ///
    /// ```json
    /// {
    ///   "title": "Internet",
    ///   "price": 350000,
    ///   "due_date": "2025-03-15",
    ///   "recurrence": "monthly"
    /// }
    /// ```
    #[tool]
    async fn save_bill(
        &self,
        Parameters(args): Parameters<SaveBillArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::save_bill(self.config(), args).await)
    }

    /// Mark a bill as paid. A one-off bill is removed; a recurring bill moves to its next due date
    /// (one week, one month or one year later, clamped to the end of shorter months). Paying does
    /// not record a transaction. If the user also wants the payment in their history, call
    /// `add_transaction` as well.
    #[tool]
    async fn pay_bill(
        &self,
        Parameters(args): Parameters<BillIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::pay_bill(self.config(), args).await)
    }

    /// Delete a bill by its ID.
    #[tool]
    async fn delete_bill(
        &self,
        Parameters(args): Parameters<BillIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_bill(self.config(), args).await)
    }

    /// List all bills, soonest due date first, with `due_today` and `overdue` flags.
    #[tool]
    async fn list_bills(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::list_bills(self.config()).await)
    }

    /// Create an empty saving plan with a positive `target`. `icon` is one of laptop, flight,
    /// shield, home, car, shopping_bag, school, work, favorite, celebration or savings (default).
    #[tool]
    async fn add_saving(
        &self,
        Parameters(args): Parameters<AddSavingArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::add_saving(self.config(), args).await)
    }

    /// Change the name, target, location or icon of a saving plan. Fields that are left out stay
    /// the same. The saved amount can only change through `deposit_saving` and `withdraw_saving`.
    #[tool]
    async fn update_saving(
        &self,
        Parameters(args): Parameters<UpdateSavingArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::update_saving(self.config(), args).await)
    }

    /// Delete a saving plan. Money held in the plan is **not** returned to the balance, so
    /// withdraw it first if the user wants to keep it.
    #[tool]
    async fn delete_saving(
        &self,
        Parameters(args): Parameters<SavingIdArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::delete_saving(self.config(), args).await)
    }

    /// Move money from the balance into a saving plan. Fails without changing anything when the
    /// balance is smaller than the amount. The deposit is recorded as an expense named
    /// `Deposit to {name}` and counts towards today's budget.
    #[tool]
    async fn deposit_saving(
        &self,
        Parameters(args): Parameters<SavingTransferArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::deposit_saving(self.config(), args).await)
    }

    /// Move money from a saving plan back to the balance. Fails without changing anything when the
    /// plan holds less than the amount. The withdrawal is recorded as income named
    /// `Withdraw from {name}`.
    #[tool]
    async fn withdraw_saving(
        &self,
        Parameters(args): Parameters<SavingTransferArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::withdraw_saving(self.config(), args).await)
    }

    /// List saving plans with their saved amount, target, `progress` (0 to 1) and whether the
    /// target has been `reached`.
    #[tool]
    async fn list_savings(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::list_savings(self.config()).await)
    }

    /// Set the daily spending budget in whole Rupiah. Zero turns the budget off.
    #[tool]
    async fn set_budget(
        &self,
        Parameters(args): Parameters<SetBudgetArgs>,
    ) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::set_budget(self.config(), args).await)
    }

    /// Compare today's spending with the daily budget. `level` is `unset`, `ok`, `warning` (more
    /// than 80% spent) or `over` (the budget has been reached).
    #[tool]
    async fn budget_status(&self) -> Result<CallToolResult, McpError> {
        require_init!(self);
        tool_result(commands::budget_status(self.config()).await)
    }
}
