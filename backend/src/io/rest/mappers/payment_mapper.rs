use crate::domain::commands::payments::{CheckoutCommand, CheckoutResult};
use crate::domain::models::payment::{PaymentNotification as DomainNotification, Plan};
use shared::{CheckoutRequest, CheckoutResponse, PaymentNotification, SubscriptionPlan};

pub struct PaymentMapper;

impl PaymentMapper {
    pub fn to_checkout_command(request: CheckoutRequest) -> CheckoutCommand {
        CheckoutCommand {
            plan: match request.plan {
                SubscriptionPlan::Weekly => Plan::Weekly,
                SubscriptionPlan::Monthly => Plan::Monthly,
            },
        }
    }

    pub fn to_checkout_response(result: CheckoutResult) -> CheckoutResponse {
        CheckoutResponse {
            order_id: result.order_id,
            amount: result.amount,
            redirect_url: result.redirect_url,
            client_key: result.client_key,
        }
    }

    pub fn to_domain_notification(dto: PaymentNotification) -> DomainNotification {
        DomainNotification {
            order_id: dto.order_id,
            transaction_status: dto.transaction_status,
            fraud_status: dto.fraud_status,
        }
    }
}
