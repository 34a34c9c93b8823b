//! Audit types

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Audited action (closed set, stored as snake_case text)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    // ═══ Auth ═══
    LoginSuccess,
    LoginFailed,
    Logout,
    PermissionDenied,

    // ═══ Users ═══
    UserCreated,
    UserUpdated,
    UserRoleChanged,
    UserActivated,
    UserDeactivated,
    UserDeleted,
    PermissionsUpdated,

    // ═══ Clients / projects ═══
    ClientCreated,
    ClientUpdated,
    ClientDeleted,
    ProjectCreated,
    ProjectUpdated,
    ProjectDeleted,
    ProjectMemberAdded,
    ProjectMemberRemoved,
    TaskCreated,
    TaskUpdated,
    TaskDeleted,

    // ═══ Finance ═══
    InvoiceCreated,
    InvoiceUpdated,
    InvoiceStatusChanged,
    InvoiceConverted,
    InvoiceDeleted,
    ExpenseCreated,
    ExpenseUpdated,
    ExpenseDeleted,
    InstallmentCreated,
    InstallmentUpdated,
    InstallmentPaid,
    InstallmentDeleted,
    PurchaseCreated,
    PurchaseUpdated,
    PurchaseDeleted,
    SaleCreated,
    SaleUpdated,
    SaleDeleted,
    BoqItemCreated,
    BoqItemUpdated,
    BoqItemDeleted,

    // ═══ HR ═══
    AttendanceRecorded,
    AttendanceDeleted,
    LeaveRequested,
    LeaveApproved,
    LeaveRejected,
    PayrollCreated,
    PayrollPaid,
    PayrollDeleted,

    // ═══ Workflow ═══
    ApprovalRequested,
    ApprovalApproved,
    ApprovalRejected,
    FileUploaded,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LoginSuccess => "login_success",
            Self::LoginFailed => "login_failed",
            Self::Logout => "logout",
            Self::PermissionDenied => "permission_denied",
            Self::UserCreated => "user_created",
            Self::UserUpdated => "user_updated",
            Self::UserRoleChanged => "user_role_changed",
            Self::UserActivated => "user_activated",
            Self::UserDeactivated => "user_deactivated",
            Self::UserDeleted => "user_deleted",
            Self::PermissionsUpdated => "permissions_updated",
            Self::ClientCreated => "client_created",
            Self::ClientUpdated => "client_updated",
            Self::ClientDeleted => "client_deleted",
            Self::ProjectCreated => "project_created",
            Self::ProjectUpdated => "project_updated",
            Self::ProjectDeleted => "project_deleted",
            Self::ProjectMemberAdded => "project_member_added",
            Self::ProjectMemberRemoved => "project_member_removed",
            Self::TaskCreated => "task_created",
            Self::TaskUpdated => "task_updated",
            Self::TaskDeleted => "task_deleted",
            Self::InvoiceCreated => "invoice_created",
            Self::InvoiceUpdated => "invoice_updated",
            Self::InvoiceStatusChanged => "invoice_status_changed",
            Self::InvoiceConverted => "invoice_converted",
            Self::InvoiceDeleted => "invoice_deleted",
            Self::ExpenseCreated => "expense_created",
            Self::ExpenseUpdated => "expense_updated",
            Self::ExpenseDeleted => "expense_deleted",
            Self::InstallmentCreated => "installment_created",
            Self::InstallmentUpdated => "installment_updated",
            Self::InstallmentPaid => "installment_paid",
            Self::InstallmentDeleted => "installment_deleted",
            Self::PurchaseCreated => "purchase_created",
            Self::PurchaseUpdated => "purchase_updated",
            Self::PurchaseDeleted => "purchase_deleted",
            Self::SaleCreated => "sale_created",
            Self::SaleUpdated => "sale_updated",
            Self::SaleDeleted => "sale_deleted",
            Self::BoqItemCreated => "boq_item_created",
            Self::BoqItemUpdated => "boq_item_updated",
            Self::BoqItemDeleted => "boq_item_deleted",
            Self::AttendanceRecorded => "attendance_recorded",
            Self::AttendanceDeleted => "attendance_deleted",
            Self::LeaveRequested => "leave_requested",
            Self::LeaveApproved => "leave_approved",
            Self::LeaveRejected => "leave_rejected",
            Self::PayrollCreated => "payroll_created",
            Self::PayrollPaid => "payroll_paid",
            Self::PayrollDeleted => "payroll_deleted",
            Self::ApprovalRequested => "approval_requested",
            Self::ApprovalApproved => "approval_approved",
            Self::ApprovalRejected => "approval_rejected",
            Self::FileUploaded => "file_uploaded",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record before it is addressed to a user/IP
#[derive(Debug, Clone)]
pub struct AuditEvent {
    pub action: AuditAction,
    pub entity_type: Option<&'static str>,
    pub entity_id: Option<i64>,
    pub details: Option<Value>,
}

impl AuditEvent {
    pub fn new(action: AuditAction) -> Self {
        Self {
            action,
            entity_type: None,
            entity_id: None,
            details: None,
        }
    }

    pub fn entity(mut self, entity_type: &'static str, entity_id: i64) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_str_matches_serde() {
        for action in [
            AuditAction::PermissionDenied,
            AuditAction::BoqItemCreated,
            AuditAction::UserRoleChanged,
            AuditAction::FileUploaded,
        ] {
            let json = serde_json::to_value(action).unwrap();
            assert_eq!(json.as_str(), Some(action.as_str()));
        }
    }
}
