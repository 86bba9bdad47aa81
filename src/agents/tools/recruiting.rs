//! Simulated recruiting tools
//!
//! Every result carries `"status": "simulated"` so downstream consumers can
//! tell these apart from real integrations.

use chrono::Utc;
use fake::faker::name::en::Name;
use fake::Fake;
use rand::Rng;
use serde_json::{json, Value};

use super::{arg_opt_str, arg_str, arg_u64, ToolContext};

const MAX_RESULTS_CAP: u64 = 20;

/// Search the (simulated) candidate database.
///
/// Missing job title / location fall back to the turn's context, then to
/// generic placeholders.
pub fn search_candidates(args: &Value, ctx: &ToolContext) -> Value {
    let job_title = arg_opt_str(args, "job_title")
        .or_else(|| ctx.job_title.clone())
        .unwrap_or_else(|| "Software Engineer".to_string());
    let location = arg_opt_str(args, "location")
        .or_else(|| ctx.location.clone())
        .unwrap_or_else(|| "Remote".to_string());
    let max_results = arg_u64(args, "max_results", 5).min(MAX_RESULTS_CAP);

    let mut rng = rand::thread_rng();
    let candidates: Vec<Value> = (0..max_results)
        .map(|_| {
            let name: String = Name().fake();
            let email = format!(
                "{}@example.com",
                name.to_lowercase().replace(' ', ".").replace('\'', "")
            );
            json!({
                "name": name,
                "email": email,
                "title": job_title,
                "location": location,
                "years_experience": rng.gen_range(2..=15),
                "match_score": rng.gen_range(60..=98),
            })
        })
        .collect();

    json!({
        "status": "simulated",
        "job_title": job_title,
        "location": location,
        "count": candidates.len(),
        "candidates": candidates,
    })
}

/// Screen a resume against job requirements with naive keyword overlap.
pub fn screen_resume(args: &Value) -> Value {
    let resume = arg_str(args, "resume_text", "").to_lowercase();
    let requirements = arg_str(args, "job_requirements", "");

    let terms: Vec<&str> = requirements
        .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
        .filter(|t| t.len() > 3)
        .collect();

    let mut strengths = Vec::new();
    let mut gaps = Vec::new();
    for term in &terms {
        if resume.contains(&term.to_lowercase()) {
            strengths.push(term.to_string());
        } else {
            gaps.push(term.to_string());
        }
    }
    strengths.truncate(8);
    gaps.truncate(8);

    let score = if terms.is_empty() {
        50
    } else {
        (strengths.len() * 100 / terms.len()).min(100)
    };

    json!({
        "status": "simulated",
        "score": score,
        "summary": format!(
            "Resume matches {} of {} screened requirement terms.",
            strengths.len(),
            terms.len()
        ),
        "strengths": strengths,
        "gaps": gaps,
    })
}

/// Draft-send an outreach email (simulated; nothing is sent).
pub fn send_outreach(args: &Value) -> Value {
    let email = arg_str(args, "candidate_email", "");
    let subject = arg_str(args, "subject", "");
    let body = arg_str(args, "body", "");

    let preview: String = body.chars().take(200).collect();

    json!({
        "status": "simulated",
        "would_send_to": email,
        "subject": subject,
        "body_preview": preview,
    })
}

/// Book an interview slot (simulated).
pub fn schedule_interview(args: &Value) -> Value {
    json!({
        "status": "simulated",
        "confirmation_id": uuid::Uuid::new_v4().to_string(),
        "candidate_email": arg_str(args, "candidate_email", ""),
        "interviewer": arg_str(args, "interviewer", "Hiring Manager"),
        "date": arg_str(args, "date", ""),
        "time": arg_str(args, "time", ""),
        "duration_minutes": arg_u64(args, "duration_minutes", 45),
    })
}

/// Move a candidate to a new ATS stage (simulated).
pub fn update_ats(args: &Value) -> Value {
    json!({
        "status": "simulated",
        "candidate_id": arg_str(args, "candidate_id", ""),
        "new_stage": arg_str(args, "new_stage", ""),
        "notes": arg_str(args, "notes", ""),
        "updated_at": Utc::now().to_rfc3339(),
    })
}
