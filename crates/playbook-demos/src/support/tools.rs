// ABOUTME: Mock backend lookups for the support swarm: order status, charges, products, diagnostics.
// ABOUTME: Each lookup is a pure function returning fixed data, wrapped as a Tool for the agents that use it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use playbook_agent::{Tool, ToolOutput};

pub const DEFAULT_DAYS_SINCE_ORDER: i64 = 3;
pub const DEFAULT_PRODUCT_TYPE: &str = "laptop";
/// Reported when the caller passes 0.0 (or nothing) as the amount.
pub const DEFAULT_CHARGE_AMOUNT: f64 = 15.99;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderStatus {
    pub order_id: String,
    pub product: String,
    pub order_date: String,
    pub status: String,
    pub shipping_status: String,
    pub estimated_delivery: String,
    pub tracking_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeInvestigation {
    pub charge_type: String,
    pub amount: f64,
    pub description: String,
    pub valid: bool,
    pub can_refund: bool,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductAlternative {
    pub name: String,
    pub price: String,
    pub availability: String,
    pub delivery: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductInfo {
    pub product: String,
    pub current_model: String,
    pub alternatives: Vec<ProductAlternative>,
    pub features: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TechnicalDiagnosis {
    pub issue: String,
    pub diagnosis: String,
    pub steps: Vec<String>,
}

/// Status of the customer's most recent order.
pub fn check_order_status(days_since_order: i64) -> OrderStatus {
    OrderStatus {
        order_id: "ORD-2024-12345".to_string(),
        product: "Laptop - Model X Pro".to_string(),
        order_date: format!("{} days ago", days_since_order),
        status: "Processing".to_string(),
        shipping_status: "Label created, awaiting carrier pickup".to_string(),
        estimated_delivery: "2-3 business days from pickup".to_string(),
        tracking_number: "1Z999AA10123456784".to_string(),
    }
}

/// Look into a charge on the customer's account.
pub fn investigate_charge(amount: f64) -> ChargeInvestigation {
    ChargeInvestigation {
        charge_type: "Express shipping upgrade".to_string(),
        amount: if amount == 0.0 {
            DEFAULT_CHARGE_AMOUNT
        } else {
            amount
        },
        description: "Expedited 2-day delivery service automatically applied".to_string(),
        valid: true,
        can_refund: true,
        note: "This charge can be removed if standard shipping is preferred".to_string(),
    }
}

/// Product details and alternatives for a product type.
pub fn get_product_info(product_type: &str) -> ProductInfo {
    let alternative = |name: &str, price: &str, delivery: &str| ProductAlternative {
        name: name.to_string(),
        price: price.to_string(),
        availability: "In stock".to_string(),
        delivery: delivery.to_string(),
    };

    ProductInfo {
        product: product_type.to_string(),
        current_model: "Model X Pro".to_string(),
        alternatives: vec![
            alternative("Model Y Ultra", "$1299", "1-2 days"),
            alternative("Model Z Elite", "$1499", "Next day"),
        ],
        features: "High performance, 16GB RAM, 512GB SSD, long battery life".to_string(),
        recommendation: "Model Y Ultra offers better value with faster delivery".to_string(),
    }
}

/// Canned troubleshooting for a described problem.
pub fn diagnose_technical_issue(issue_description: &str) -> TechnicalDiagnosis {
    TechnicalDiagnosis {
        issue: issue_description.to_string(),
        diagnosis: "Common connectivity issue".to_string(),
        steps: vec![
            "Restart device".to_string(),
            "Check network settings".to_string(),
            "Update firmware".to_string(),
        ],
    }
}

fn default_days_since_order() -> i64 {
    DEFAULT_DAYS_SINCE_ORDER
}

fn default_product_type() -> String {
    DEFAULT_PRODUCT_TYPE.to_string()
}

#[derive(Debug, Deserialize)]
struct OrderStatusParams {
    #[serde(default = "default_days_since_order")]
    days_since_order: i64,
}

#[derive(Debug, Deserialize)]
struct ChargeParams {
    #[serde(default)]
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct ProductParams {
    #[serde(default = "default_product_type")]
    product_type: String,
}

#[derive(Debug, Deserialize)]
struct DiagnoseParams {
    issue_description: String,
}

/// Decode tool input; a null input counts as an empty object.
fn params<T: for<'de> Deserialize<'de>>(tool: &str, input: Value) -> Result<T, anyhow::Error> {
    let input = if input.is_null() { json!({}) } else { input };
    serde_json::from_value(input).map_err(|e| anyhow::anyhow!("invalid input for {}: {}", tool, e))
}

fn to_output<T: Serialize>(value: &T) -> Result<ToolOutput, anyhow::Error> {
    Ok(ToolOutput::json(serde_json::to_value(value)?))
}

pub struct CheckOrderStatusTool;

#[async_trait]
impl Tool for CheckOrderStatusTool {
    fn name(&self) -> &str {
        "check_order_status"
    }

    fn description(&self) -> &str {
        "Check the status of recent orders."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "days_since_order": {
                    "type": "integer",
                    "description": "Number of days since the order was placed (default: 3)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, anyhow::Error> {
        let p: OrderStatusParams = params(self.name(), input)?;
        to_output(&check_order_status(p.days_since_order))
    }
}

pub struct InvestigateChargeTool;

#[async_trait]
impl Tool for InvestigateChargeTool {
    fn name(&self) -> &str {
        "investigate_charge"
    }

    fn description(&self) -> &str {
        "Investigate a billing charge on customer's account."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "amount": {
                    "type": "number",
                    "description": "The charge amount to investigate (optional)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, anyhow::Error> {
        let p: ChargeParams = params(self.name(), input)?;
        to_output(&investigate_charge(p.amount))
    }
}

pub struct GetProductInfoTool;

#[async_trait]
impl Tool for GetProductInfoTool {
    fn name(&self) -> &str {
        "get_product_info"
    }

    fn description(&self) -> &str {
        "Get product information and recommendations."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_type": {
                    "type": "string",
                    "description": "Type of product (e.g., laptop, phone)"
                }
            },
            "required": []
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, anyhow::Error> {
        let p: ProductParams = params(self.name(), input)?;
        to_output(&get_product_info(&p.product_type))
    }
}

pub struct DiagnoseTechnicalIssueTool;

#[async_trait]
impl Tool for DiagnoseTechnicalIssueTool {
    fn name(&self) -> &str {
        "diagnose_technical_issue"
    }

    fn description(&self) -> &str {
        "Diagnose a technical issue."
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "issue_description": {
                    "type": "string",
                    "description": "Description of the technical problem"
                }
            },
            "required": ["issue_description"]
        })
    }

    async fn execute(&self, input: Value) -> Result<ToolOutput, anyhow::Error> {
        let p: DiagnoseParams = params(self.name(), input)?;
        to_output(&diagnose_technical_issue(&p.issue_description))
    }
}
