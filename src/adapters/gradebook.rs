use crate::domain::model::{Action, Submission};
use crate::domain::ports::{Gradebook, Storage};
use crate::utils::error::{LtiError, Result};
use serde::Deserialize;
use std::collections::HashMap;

type SubmissionKey = (String, String);

fn key(assignment: &str, student_id: &str) -> SubmissionKey {
    (assignment.to_string(), student_id.to_string())
}

fn not_found(assignment: &str, student_id: &str) -> LtiError {
    LtiError::SubmissionNotFound {
        assignment: assignment.to_string(),
        student: student_id.to_string(),
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryGradebook {
    submissions: HashMap<SubmissionKey, Submission>,
}

impl InMemoryGradebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, submission: Submission) {
        self.submissions.insert(
            key(&submission.assignment, &submission.student_id),
            submission,
        );
    }

    pub fn with_score(mut self, assignment: &str, student_id: &str, score: f64) -> Self {
        self.insert(Submission {
            assignment: assignment.to_string(),
            student_id: student_id.to_string(),
            score,
            max_score: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

impl Gradebook for InMemoryGradebook {
    fn find_submission(&self, assignment: &str, student_id: &str) -> Result<Submission> {
        self.submissions
            .get(&key(assignment, student_id))
            .cloned()
            .ok_or_else(|| not_found(assignment, student_id))
    }
}

/// 成績匯出 CSV 的一列；只讀取需要的欄位，其他欄位忽略
#[derive(Debug, Deserialize)]
struct GradeRow {
    assignment: String,
    student_id: String,
    score: String,
    #[serde(default)]
    max_score: Option<String>,
}

/// 從宿主系統匯出的 grades.csv 載入的成績簿
#[derive(Debug, Clone, Default)]
pub struct CsvGradebook {
    inner: InMemoryGradebook,
}

impl CsvGradebook {
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut inner = InMemoryGradebook::new();
        for (line, row) in csv_reader.deserialize::<GradeRow>().enumerate() {
            let row = row?;
            let score = parse_score(&row.score, line + 2)?;
            let max_score = match row.max_score.as_deref() {
                Some(value) if !value.is_empty() => Some(parse_score(value, line + 2)?),
                _ => None,
            };

            inner.insert(Submission {
                assignment: row.assignment,
                student_id: row.student_id,
                score,
                max_score,
            });
        }

        tracing::debug!("Loaded {} submissions from gradebook", inner.len());
        Ok(Self { inner })
    }

    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        let data = storage.read_file(path).await?;
        Self::from_reader(data.as_slice())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Gradebook for CsvGradebook {
    fn find_submission(&self, assignment: &str, student_id: &str) -> Result<Submission> {
        self.inner.find_submission(assignment, student_id)
    }
}

fn parse_score(value: &str, line: usize) -> Result<f64> {
    value.parse::<f64>().map_err(|_| LtiError::ProcessingError {
        message: format!("Invalid score '{}' on line {}", value, line),
    })
}

/// 只有 replace 需要成績；read 與 delete 不讀取成績簿檔案
pub async fn load_for_action<S: Storage>(
    storage: &S,
    path: &str,
    action: Action,
) -> Result<Box<dyn Gradebook>> {
    match action {
        Action::Replace => {
            tracing::info!("📖 Loading gradebook from {}", path);
            Ok(Box::new(CsvGradebook::load(storage, path).await?))
        }
        Action::Read | Action::Delete => Ok(Box::new(InMemoryGradebook::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRADES_CSV: &str = "\
assignment,duedate,timestamp,student_id,last_name,first_name,email,raw_score,late_submission_penalty,score,max_score
ps1,2015-02-02 22:58:23.948203,2015-02-02 20:58:23.948203,bar,,,,1.5,0.0,1.5,3.0
ps1,2015-02-02 22:58:23.948203,,foo,,,,0.0,0.0,0.0,3.0
ps2,,,foo,,,,2.0,0.0,2.0,
";

    #[test]
    fn test_find_submission_from_grade_export() {
        let gradebook = CsvGradebook::from_csv_str(GRADES_CSV).unwrap();
        assert_eq!(gradebook.len(), 3);

        let submission = gradebook.find_submission("ps1", "bar").unwrap();
        assert_eq!(submission.score, 1.5);
        assert_eq!(submission.max_score, Some(3.0));

        let ps2 = gradebook.find_submission("ps2", "foo").unwrap();
        assert_eq!(ps2.max_score, None);
    }

    #[test]
    fn test_zero_score_is_a_real_score() {
        let gradebook = CsvGradebook::from_csv_str(GRADES_CSV).unwrap();
        let submission = gradebook.find_submission("ps1", "foo").unwrap();
        assert_eq!(submission.score, 0.0);
    }

    #[test]
    fn test_missing_submission() {
        let gradebook = CsvGradebook::from_csv_str(GRADES_CSV).unwrap();
        let err = gradebook.find_submission("ps2", "bar").unwrap_err();
        assert!(matches!(err, LtiError::SubmissionNotFound { .. }));
    }

    #[test]
    fn test_invalid_score_is_reported() {
        let csv = "assignment,student_id,score\nps1,foo,n/a\n";
        let err = CsvGradebook::from_csv_str(csv).unwrap_err();
        assert!(matches!(err, LtiError::ProcessingError { ref message } if message.contains("line 2")));
    }

    #[test]
    fn test_in_memory_gradebook() {
        let gradebook = InMemoryGradebook::new().with_score("ps1", "foo", 0.75);
        assert_eq!(gradebook.find_submission("ps1", "foo").unwrap().score, 0.75);
        assert!(gradebook.find_submission("ps1", "bar").is_err());
    }

    #[tokio::test]
    async fn test_read_action_skips_gradebook_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let storage = crate::adapters::storage::LocalStorage::new(
            temp_dir.path().to_str().unwrap().to_string(),
        );

        // grades.csv 不存在也不影響 read
        let gradebook = load_for_action(&storage, "grades.csv", Action::Read)
            .await
            .unwrap();
        assert!(gradebook.find_submission("ps1", "foo").is_err());

        assert!(load_for_action(&storage, "grades.csv", Action::Replace)
            .await
            .is_err());
    }
}
