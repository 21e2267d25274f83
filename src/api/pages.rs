use askama::Template;

/// Choices offered in the faculty name drop-down.
pub const FACULTY_OPTIONS: [&str; 4] = ["Dr. Smith", "Prof. Johnson", "Dr. Williams", "Other"];

#[derive(Template)]
#[template(path = "form.html")]
pub struct UploadFormPage<'a> {
    pub faculty_options: &'a [&'a str],
}

impl Default for UploadFormPage<'static> {
    fn default() -> Self {
        Self {
            faculty_options: &FACULTY_OPTIONS,
        }
    }
}

#[derive(Template)]
#[template(path = "success.html")]
pub struct SuccessPage<'a> {
    pub file_name: &'a str,
    pub file_id: &'a str,
}

#[derive(Template)]
#[template(path = "failure.html")]
pub struct FailurePage<'a> {
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_page_has_every_field() {
        let html = UploadFormPage::default().render().unwrap();
        for name in ["facultyName", "facultyId", "title", "issueDate", "file"] {
            assert!(
                html.contains(&format!("name=\"{}\"", name)),
                "missing field {}",
                name
            );
        }
        assert!(html.contains("action=\"/upload\""));
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("Prof. Johnson"));
    }

    #[test]
    fn test_failure_page_escapes_message() {
        let html = FailurePage {
            message: "<script>alert(1)</script>",
        }
        .render()
        .unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_success_page_mentions_file() {
        let html = SuccessPage {
            file_name: "policy.pdf",
            file_id: "drive-1",
        }
        .render()
        .unwrap();
        assert!(html.contains("Upload Successful"));
        assert!(html.contains("policy.pdf"));
        assert!(html.contains("drive-1"));
    }
}
