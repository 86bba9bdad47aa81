//! Sourcing workflow generator
//!
//! Pure text templating over a few free-text inputs with light keyword
//! sniffing. Always returns non-empty structured text echoing the inputs
//! used.

use serde_json::{json, Value};

use super::arg_str;

/// Vocabulary that triggers the ML-platform search block.
const ML_PLATFORM_TERMS: &[&str] = &[
    "machine learning",
    "ml platform",
    "mlops",
    "data scien",
    "kubeflow",
    "pytorch",
    "tensorflow",
    "llm",
];

pub fn get_sourcing_workflow(args: &Value) -> Value {
    let seniority = arg_str(args, "seniority", "senior");
    let stack = arg_str(args, "stack", "general software");
    let work_model = arg_str(args, "work_model", "hybrid");
    let must_haves = arg_str(args, "must_haves", "");

    let stack_lower = stack.to_lowercase();
    let ml_focus = ML_PLATFORM_TERMS.iter().any(|t| stack_lower.contains(t));

    let mut workflow = String::new();
    workflow.push_str(&format!(
        "## Sourcing workflow: {seniority} {stack} ({work_model})\n\n"
    ));

    workflow.push_str("### 1. Role profile\n");
    workflow.push_str(&format!(
        "- Target seniority: {seniority}\n- Core stack: {stack}\n- Work model: {work_model}\n"
    ));
    if must_haves.trim().is_empty() {
        workflow.push_str("- Must-haves: none specified; confirm with the hiring manager\n");
    } else {
        workflow.push_str(&format!("- Must-haves: {must_haves}\n"));
    }

    workflow.push_str("\n### 2. Boolean search strings\n");
    workflow.push_str(&format!(
        "- LinkedIn: (\"{seniority}\" OR lead) AND ({stack}) AND (\"{work_model}\" OR open to relocation)\n"
    ));
    workflow.push_str(&format!(
        "- GitHub/StackOverflow: {stack} profiles with recent activity and public projects\n"
    ));
    if !must_haves.trim().is_empty() {
        workflow.push_str(&format!(
            "- Narrowing terms from must-haves: {must_haves}\n"
        ));
    }

    if ml_focus {
        workflow.push_str("\n### 2b. ML platform search\n");
        workflow.push_str(
            "- Search for contributors to MLOps tooling (Kubeflow, MLflow, Ray, Feast)\n\
             - Conference speaker lists: NeurIPS, MLSys, KubeCon ML track\n\
             - Filter for production model-serving experience, not only research\n",
        );
    }

    workflow.push_str("\n### 3. Channels\n");
    workflow.push_str(
        "- Warm: employee referrals, past applicants in the ATS, alumni networks\n\
         - Cold: LinkedIn Recruiter, targeted communities, niche job boards\n",
    );

    workflow.push_str("\n### 4. Outreach sequence\n");
    workflow.push_str(&format!(
        "- Day 0: personalized email referencing {stack} work\n\
         - Day 3: short LinkedIn follow-up\n\
         - Day 7: final nudge with role highlights and the {work_model} setup\n"
    ));

    json!({
        "status": "simulated",
        "workflow": workflow,
        "inputs": {
            "seniority": seniority,
            "stack": stack,
            "work_model": work_model,
            "must_haves": must_haves,
        }
    })
}
