use crate::infra::{parse_date, InMemoryRequestRepository};
use chrono::NaiveDate;
use clap::Args;
use std::sync::Arc;
use veridaq::config::TelemetryConfig;
use veridaq::error::AppError;
use veridaq::requests::{
    FieldUpdate, FieldView, IndividualRequestService, RequestDraft, RequestId, RequestSchema,
    RequestWizard, StoreGateway, WizardError, WizardView,
};
use veridaq::session::{AuthContext, SessionData};
use veridaq::telemetry;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Issuer email entered on step 1
    #[arg(long)]
    pub(crate) email: Option<String>,
    /// Request type: reference or recommendation
    #[arg(long = "type")]
    pub(crate) type_of_request: Option<String>,
    /// Full name of the addressee
    #[arg(long)]
    pub(crate) addressee: Option<String>,
    /// Relationship to the issuer
    #[arg(long)]
    pub(crate) relationship: Option<String>,
    /// Date the relationship began (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) since: Option<NaiveDate>,
    /// Personality review text
    #[arg(long)]
    pub(crate) personality_review: Option<String>,
    /// Recommendation statement text
    #[arg(long)]
    pub(crate) recommendation: Option<String>,
    /// Store a sample request first and run the wizard as an edit of it
    #[arg(long)]
    pub(crate) edit: bool,
}

fn sample_draft() -> RequestDraft {
    RequestDraft {
        email: "issuer@veridaq.local".to_string(),
        type_of_request: "reference".to_string(),
        addressee_full_name: "Hiring Manager".to_string(),
        relationship: "Former colleague".to_string(),
        years_of_relationship: NaiveDate::from_ymd_opt(2018, 6, 1),
        personality_review: "Dependable, candid and quick to help".to_string(),
        recommendation_statement: "I would gladly work with them again".to_string(),
        id: None,
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    telemetry::init(&TelemetryConfig {
        log_level: "warn".to_string(),
    })?;

    let session = SessionData::logged_in("demo-user", "issuer@veridaq.local");
    let Some(auth) = AuthContext::from_session(&session) else {
        println!("Demo session is not signed in");
        return Ok(());
    };

    let repository = Arc::new(InMemoryRequestRepository::default());
    let service = Arc::new(IndividualRequestService::new(repository.clone()));

    let doc_id = if args.edit {
        match RequestSchema.validate(&sample_draft()) {
            Ok(fields) => Some(service.create_or_update(&auth, fields, None)?.id),
            Err(errors) => {
                println!("Sample draft rejected: {errors:?}");
                return Ok(());
            }
        }
    } else {
        None
    };

    let gateway = StoreGateway::new(service, auth);
    println!("Veridaq individual request demo");
    run_wizard(&gateway, doc_id, args).await;

    println!("\nStored requests");
    for record in repository.records() {
        println!(
            "  {} [{}] for {} (issued: {})",
            record.id,
            record.fields.type_of_request.label(),
            record.fields.email,
            record.issued
        );
    }
    Ok(())
}

async fn run_wizard(
    gateway: &StoreGateway<InMemoryRequestRepository>,
    doc_id: Option<RequestId>,
    args: DemoArgs,
) {
    let editing = doc_id.is_some();
    let mut wizard = RequestWizard::new(doc_id);
    if editing && wizard.hydrate(gateway).await {
        println!("Loaded stored draft for editing");
    }

    let sample = sample_draft();
    let pick = |value: Option<String>, fallback: String| {
        value.or(if editing { None } else { Some(fallback) })
    };

    if let Some(email) = pick(args.email, sample.email) {
        apply(&mut wizard, FieldUpdate::Email(email));
    }
    render(&wizard.view());
    if let Err(err) = wizard.continue_to_details() {
        println!("Cannot continue: {err}");
        return;
    }

    let details = [
        pick(args.type_of_request, sample.type_of_request).map(FieldUpdate::TypeOfRequest),
        pick(args.addressee, sample.addressee_full_name).map(FieldUpdate::AddresseeFullName),
        pick(args.relationship, sample.relationship).map(FieldUpdate::Relationship),
        args.since
            .or(if editing {
                None
            } else {
                sample.years_of_relationship
            })
            .map(|date| FieldUpdate::YearsOfRelationship(Some(date))),
        pick(args.personality_review, sample.personality_review)
            .map(FieldUpdate::PersonalityReview),
        pick(args.recommendation, sample.recommendation_statement)
            .map(FieldUpdate::RecommendationStatement),
    ];
    for update in details.into_iter().flatten() {
        apply(&mut wizard, update);
    }
    render(&wizard.view());

    match wizard.submit(gateway).await {
        Ok(_) => render(&wizard.view()),
        Err(WizardError::Invalid(_)) => {
            println!("\nSubmission blocked; fix the fields below");
            render(&wizard.view());
        }
        Err(err) => println!("Submission not started: {err}"),
    }
}

fn apply(wizard: &mut RequestWizard, update: FieldUpdate) {
    if let Err(err) = wizard.set_field(update) {
        println!("Edit rejected: {err}");
    }
}

fn render(view: &WizardView) {
    match view {
        WizardView::Identity { step_label, fields } => {
            println!("\n{step_label}: issuer identity");
            render_fields(fields);
        }
        WizardView::Details {
            step_label,
            fields,
            date_bounds,
            ..
        } => {
            println!("\n{step_label}: request details");
            render_fields(fields);
            println!(
                "  (relationship date between {} and {})",
                date_bounds.earliest, date_bounds.latest
            );
        }
        WizardView::Outcome { outcome, message } => {
            println!("\nOutcome: {outcome:?}");
            println!("  {message}");
        }
    }
}

fn render_fields(fields: &[FieldView]) {
    for field in fields {
        let value = if field.value.is_empty() {
            format!("<{}>", field.placeholder)
        } else {
            field.value.clone()
        };
        println!("  {:<22} {}", field.label, value);
        for error in &field.errors {
            println!("  {:<22} ! {}", "", error);
        }
    }
}
