//! Pure markup renderers. Each function maps page data to an HTML string
//! and nothing else; handlers in `http` decide which one to call.

use crate::bills::BillCard;

/// Current page, used to highlight the matching sidebar icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Bills,
    NewBill,
}

/// What the bills page has to show.
#[derive(Clone, Debug)]
pub enum BillsPage {
    Loading,
    Error(String),
    Loaded(Vec<BillCard>),
}

/// Proof fields carried back into the form after a successful upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProofView {
    pub file_url: String,
    pub key: String,
    pub file_name: String,
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn layout(route: Route, title: &str, body: &str) -> String {
    let window_class = if route == Route::Bills { " active-icon" } else { "" };
    let mail_class = if route == Route::NewBill { " active-icon" } else { "" };
    format!(
        r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>{title} - Notes de frais</title></head>
<body>
<div class="vertical-navbar">
  <a href="/bills" data-testid="icon-window" class="layout-icon{window_class}">🧾</a>
  <a href="/bills/new" data-testid="icon-mail" class="layout-icon{mail_class}">✉</a>
  <form method="post" action="/logout"><button data-testid="layout-disconnect" type="submit">Se déconnecter</button></form>
</div>
<main id="root">
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

fn bill_row(card: &BillCard) -> String {
    let amount = card
        .amount
        .map(|cents| format!("{cents} €"))
        .unwrap_or_default();
    format!(
        r#"    <tr>
      <td data-testid="bill-type">{expense_type}</td>
      <td data-testid="bill-name">{name}</td>
      <td data-testid="bill-date" data-date="{date_raw}">{date}</td>
      <td data-testid="bill-amount">{amount}</td>
      <td data-testid="bill-status">{status}</td>
      <td><a href="/bills/{id}/proof" data-testid="icon-eye" data-bill-url="{file_url}">👁</a></td>
    </tr>"#,
        expense_type = escape(&card.expense_type),
        name = escape(&card.name),
        date_raw = escape(&card.date_raw),
        date = escape(&card.date_display),
        status = escape(&card.status_display),
        id = card.id,
        file_url = escape(&card.file_url),
    )
}

/// The bills list page in all three of its states.
pub fn bills_ui(page: &BillsPage) -> String {
    let body = match page {
        BillsPage::Loading => r#"<div data-testid="loading-message">Loading...</div>"#.to_string(),
        BillsPage::Error(message) => format!(
            r#"<div data-testid="error-message">Erreur<br>{}</div>"#,
            escape(message)
        ),
        BillsPage::Loaded(cards) => {
            let rows = cards.iter().map(bill_row).collect::<Vec<_>>().join("\n");
            format!(
                r#"<div class="content-header">
  <h1 data-testid="content-title">Mes notes de frais</h1>
  <a href="/bills/new"><button type="button" data-testid="btn-new-bill">Nouvelle note de frais</button></a>
</div>
<table id="data-table">
  <thead><tr><th>Type</th><th>Nom</th><th>Date</th><th>Montant</th><th>Statut</th><th>Actions</th></tr></thead>
  <tbody data-testid="tbody">
{rows}
  </tbody>
</table>"#
            )
        }
    };
    layout(Route::Bills, "Mes notes de frais", &body)
}

const EXPENSE_TYPES: [&str; 7] = [
    "Transports",
    "Restaurants et bars",
    "Hôtel et logement",
    "Services en ligne",
    "IT et électronique",
    "Equipement et matériel",
    "Fournitures de bureau",
];

/// The new-bill form. `alert` mirrors the original's window.alert text,
/// `proof` fills the hidden fields after a successful upload.
pub fn new_bill_ui(alert: Option<&str>, proof: Option<&ProofView>) -> String {
    let alert_html = alert
        .map(|text| format!(r#"<div class="alert" data-testid="alert-message">{}</div>"#, escape(text)))
        .unwrap_or_default();
    let options = EXPENSE_TYPES
        .iter()
        .map(|label| format!(r#"      <option value="{label}">{label}</option>"#))
        .collect::<Vec<_>>()
        .join("\n");
    let (file_attr, file_note, hidden) = match proof {
        Some(proof) => (
            format!(r#" data-file-name="{}""#, escape(&proof.file_name)),
            format!(
                r#"<span data-testid="file-name">{}</span>"#,
                escape(&proof.file_name)
            ),
            format!(
                r#"  <input type="hidden" name="file_url" value="{url}">
  <input type="hidden" name="file_key" value="{key}">
  <input type="hidden" name="file_name" value="{name}">"#,
                url = escape(&proof.file_url),
                key = escape(&proof.key),
                name = escape(&proof.file_name),
            ),
        ),
        None => (
            String::new(),
            String::new(),
            r#"  <input type="hidden" name="file_url" value="">
  <input type="hidden" name="file_key" value="">
  <input type="hidden" name="file_name" value="">"#
                .to_string(),
        ),
    };
    let body = format!(
        r#"<h1 data-testid="content-title">Envoyer une note de frais</h1>
{alert_html}
<form method="post" action="/bills/new/file" enctype="multipart/form-data" data-testid="form-file">
  <label for="file">Justificatif</label>
  <input type="file" id="file" name="file" data-testid="file"{file_attr}>
  {file_note}
  <button type="submit" data-testid="btn-attach-file">Joindre</button>
</form>
<form method="post" action="/bills/new" data-testid="form-new-bill">
  <label for="expense-type">Type de dépense</label>
  <select id="expense-type" name="expense_type" data-testid="expense-type">
{options}
  </select>
  <label for="expense-name">Nom de la dépense</label>
  <input type="text" id="expense-name" name="expense_name" data-testid="expense-name" placeholder="Vol Paris Londres">
  <label for="datepicker">Date</label>
  <input type="date" id="datepicker" name="datepicker" data-testid="datepicker">
  <label for="amount">Montant TTC</label>
  <input type="number" id="amount" name="amount" data-testid="amount" placeholder="348">
  <label for="vat">TVA</label>
  <input type="number" id="vat" name="vat" data-testid="vat" placeholder="70">
  <input type="number" id="pct" name="pct" data-testid="pct" placeholder="20">
  <label for="commentary">Commentaire</label>
  <textarea id="commentary" name="commentary" data-testid="commentary"></textarea>
{hidden}
  <button type="submit" id="btn-send-bill" data-testid="btn-send-bill">Envoyer</button>
</form>"#
    );
    layout(Route::NewBill, "Envoyer une note de frais", &body)
}

/// Modal-style page showing the proof image attached to a bill.
pub fn proof_modal_ui(file_url: &str) -> String {
    let body = format!(
        r#"<div class="modal" data-testid="modaleFile">
  <h2>Justificatif</h2>
  <div class="modal-body">
    <img data-testid="modal-img" src="{url}" alt="justificatif" width="100%">
  </div>
  <a href="/bills" data-testid="modal-close">Fermer</a>
</div>"#,
        url = escape(file_url),
    );
    layout(Route::Bills, "Justificatif", &body)
}

/// Standalone login page; no sidebar until a user record exists.
pub fn login_ui() -> String {
    r#"<!DOCTYPE html>
<html lang="fr">
<head><meta charset="utf-8"><title>Connexion - Notes de frais</title></head>
<body>
<main id="root">
<h1 data-testid="content-title">Connexion</h1>
<form method="post" action="/login" data-testid="form-employee">
  <label for="email">Adresse e-mail</label>
  <input type="email" id="email" name="email" data-testid="employee-email-input" required>
  <label for="user-type">Profil</label>
  <select id="user-type" name="user_type" data-testid="employee-type-input">
    <option value="Employee">Employé</option>
    <option value="Admin">Administrateur</option>
  </select>
  <button type="submit" data-testid="employee-login-button">Se connecter</button>
</form>
</main>
</body>
</html>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bills::load_bills;
    use platform_store::mock::MockStore;

    #[tokio::test]
    async fn bills_page_shows_title_and_new_bill_button() {
        let cards = load_bills(&MockStore::new()).await.expect("fixtures");
        let html = bills_ui(&BillsPage::Loaded(cards));
        assert!(html.contains("Mes notes de frais"));
        assert!(html.contains(r#"data-testid="btn-new-bill""#));
        assert!(html.contains(r#"data-testid="icon-window" class="layout-icon active-icon""#));
    }

    #[tokio::test]
    async fn bills_page_rows_keep_raw_dates_in_order() {
        let cards = load_bills(&MockStore::new()).await.expect("fixtures");
        let html = bills_ui(&BillsPage::Loaded(cards));
        let dates: Vec<&str> = html
            .match_indices("data-date=\"")
            .map(|(idx, _)| {
                let rest = &html[idx + 11..];
                &rest[..rest.find('"').unwrap()]
            })
            .collect();
        assert_eq!(dates, vec!["2004-04-04", "2003-03-03", "2002-02-02", "2001-01-01"]);
    }

    #[test]
    fn error_state_renders_the_literal_message() {
        let html = bills_ui(&BillsPage::Error("Erreur 404".to_string()));
        assert!(html.contains("Erreur 404"));
        assert!(html.contains(r#"data-testid="error-message""#));
    }

    #[test]
    fn loading_state_renders_placeholder() {
        let html = bills_ui(&BillsPage::Loading);
        assert!(html.contains("Loading..."));
    }

    #[test]
    fn empty_form_has_every_field_and_no_proof() {
        let html = new_bill_ui(None, None);
        for testid in [
            "form-new-bill",
            "expense-type",
            "expense-name",
            "datepicker",
            "amount",
            "vat",
            "pct",
            "commentary",
            "file",
        ] {
            assert!(
                html.contains(&format!(r#"data-testid="{testid}""#)),
                "missing {testid}"
            );
        }
        assert!(html.contains("Envoyer une note de frais"));
        assert!(!html.contains("data-file-name"));
        assert!(html.contains(r#"name="file_key" value="""#));
    }

    #[test]
    fn uploaded_proof_populates_the_file_control() {
        let proof = ProofView {
            file_url: "https://localhost:3456/images/test.jpg".to_string(),
            key: "1234".to_string(),
            file_name: "facturefreemobile.jpg".to_string(),
        };
        let html = new_bill_ui(None, Some(&proof));
        assert!(html.contains(r#"data-file-name="facturefreemobile.jpg""#));
        assert!(html.contains(r#"name="file_key" value="1234""#));
        assert!(html.contains(r#"data-testid="icon-mail" class="layout-icon active-icon""#));
    }

    #[test]
    fn alerts_render_verbatim() {
        let html = new_bill_ui(Some(crate::new_bill::MISSING_FILE_ALERT), None);
        assert!(html.contains("Veuillez soumettre le fichier avant de continuer."));
    }

    #[test]
    fn proof_modal_embeds_the_image() {
        let html = proof_modal_ui("https://localhost:3456/images/test.jpg");
        assert!(html.contains(r#"data-testid="modal-img""#));
        assert!(html.contains(r#"src="https://localhost:3456/images/test.jpg""#));
        assert!(html.contains("Justificatif"));
    }

    #[test]
    fn interpolated_values_are_escaped() {
        let html = bills_ui(&BillsPage::Error("<script>".to_string()));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
