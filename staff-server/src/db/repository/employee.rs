//! Employee Repository

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::models::{Employee, EmployeeRequest};

use super::{RepoError, RepoResult, ResourceStore, email_key};

#[derive(Debug)]
pub struct EmployeeRepository {
    rows: DashMap<i64, Employee>,
    /// email (case-folded) -> employee id
    emails: DashMap<String, i64>,
    next_id: AtomicI64,
}

impl Default for EmployeeRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl EmployeeRepository {
    pub fn new() -> Self {
        Self {
            rows: DashMap::new(),
            emails: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// All employees, ordered by id
    pub fn find_all(&self) -> Vec<Employee> {
        let mut all: Vec<Employee> = self.rows.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|e| e.id);
        all
    }

    pub fn find_by_id(&self, id: i64) -> Option<Employee> {
        self.rows.get(&id).map(|r| r.value().clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<Employee> {
        let id = *self.emails.get(&email_key(email))?;
        self.find_by_id(id)
    }

    /// Case-insensitive exact department match
    pub fn find_by_department(&self, department: &str) -> Vec<Employee> {
        self.filter(|e| e.department.eq_ignore_ascii_case(department.trim()))
    }

    /// Case-insensitive substring match over names, email and department.
    /// An empty term matches everyone.
    pub fn search(&self, term: &str) -> Vec<Employee> {
        let needle = term.trim().to_lowercase();
        self.filter(|e| {
            [&e.first_name, &e.last_name, &e.email, &e.department]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
    }

    pub fn count_by_department(&self, department: &str) -> usize {
        self.find_by_department(department).len()
    }

    pub fn exists_by_email(&self, email: &str) -> bool {
        self.emails.contains_key(&email_key(email))
    }

    /// `true` when `email` belongs to an employee other than `id`
    pub fn exists_by_email_and_not_id(&self, email: &str, id: i64) -> bool {
        self.emails
            .get(&email_key(email))
            .is_some_and(|owner| *owner != id)
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }

    pub fn create(&self, data: &EmployeeRequest) -> RepoResult<Employee> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        match self.emails.entry(email_key(&data.email)) {
            Entry::Occupied(_) => {
                return Err(RepoError::Duplicate(format!(
                    "Email '{}' is already in use",
                    data.email
                )));
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let now = Utc::now();
        let employee = Employee {
            id,
            first_name: data.first_name.clone(),
            last_name: data.last_name.clone(),
            email: data.email.clone(),
            phone: data.phone.clone(),
            department: data.department.clone(),
            salary: data.salary,
            date_of_joining: data.date_of_joining,
            created_at: now,
            updated_at: now,
        };
        self.rows.insert(id, employee.clone());

        tracing::debug!(employee_id = id, "Employee created");
        Ok(employee)
    }

    pub fn update(&self, id: i64, data: &EmployeeRequest) -> RepoResult<Employee> {
        let old_key = self
            .rows
            .get(&id)
            .map(|r| email_key(&r.email))
            .ok_or_else(|| RepoError::NotFound(format!("Employee {}", id)))?;

        let new_key = email_key(&data.email);
        let email_changed = new_key != old_key;
        if email_changed {
            match self.emails.entry(new_key.clone()) {
                Entry::Occupied(_) => {
                    return Err(RepoError::Duplicate(format!(
                        "Email '{}' is already in use by another employee",
                        data.email
                    )));
                }
                Entry::Vacant(slot) => {
                    slot.insert(id);
                }
            }
        }

        let updated = match self.rows.get_mut(&id) {
            Some(mut row) => {
                let e = row.value_mut();
                e.first_name = data.first_name.clone();
                e.last_name = data.last_name.clone();
                e.email = data.email.clone();
                e.phone = data.phone.clone();
                e.department = data.department.clone();
                e.salary = data.salary;
                e.date_of_joining = data.date_of_joining;
                e.updated_at = Utc::now();
                e.clone()
            }
            None => {
                // Deleted concurrently
                if email_changed {
                    self.emails.remove_if(&new_key, |_, owner| *owner == id);
                }
                return Err(RepoError::NotFound(format!("Employee {}", id)));
            }
        };

        if email_changed {
            self.emails.remove_if(&old_key, |_, owner| *owner == id);
        }

        Ok(updated)
    }

    /// `false` when no such employee
    pub fn delete(&self, id: i64) -> bool {
        match self.rows.remove(&id) {
            Some((_, removed)) => {
                self.emails
                    .remove_if(&email_key(&removed.email), |_, owner| *owner == id);
                tracing::debug!(employee_id = id, "Employee deleted");
                true
            }
            None => false,
        }
    }

    fn filter(&self, pred: impl Fn(&Employee) -> bool) -> Vec<Employee> {
        let mut matched: Vec<Employee> = self
            .rows
            .iter()
            .filter(|r| pred(r.value()))
            .map(|r| r.value().clone())
            .collect();
        matched.sort_by_key(|e| e.id);
        matched
    }
}

#[async_trait]
impl ResourceStore for EmployeeRepository {
    async fn exists(&self, id: i64) -> RepoResult<bool> {
        Ok(self.rows.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn request(first: &str, last: &str, department: &str) -> EmployeeRequest {
        EmployeeRequest {
            first_name: first.into(),
            last_name: last.into(),
            email: format!("{}.{}@company.com", first, last).to_lowercase(),
            phone: None,
            department: department.into(),
            salary: Decimal::from(50000),
            date_of_joining: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            password: None,
        }
    }

    fn repo() -> EmployeeRepository {
        let repo = EmployeeRepository::new();
        repo.create(&request("John", "Doe", "Engineering")).unwrap();
        repo.create(&request("Jane", "Smith", "Marketing")).unwrap();
        repo.create(&request("Mike", "Johnson", "Engineering")).unwrap();
        repo
    }

    #[test]
    fn test_ids_are_sequential() {
        let repo = repo();
        let ids: Vec<i64> = repo.find_all().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let repo = repo();
        let mut dup = request("Johnny", "Doe", "IT");
        dup.email = "JOHN.DOE@company.com".into();
        assert!(matches!(repo.create(&dup), Err(RepoError::Duplicate(_))));
        assert_eq!(repo.count(), 3);
    }

    #[test]
    fn test_department_and_search() {
        let repo = repo();
        assert_eq!(repo.find_by_department("engineering").len(), 2);
        assert_eq!(repo.count_by_department("Marketing"), 1);
        assert_eq!(repo.find_by_department("Sales").len(), 0);

        let hits = repo.search("john");
        let names: Vec<String> = hits.iter().map(|e| e.full_name()).collect();
        assert_eq!(names, vec!["John Doe", "Mike Johnson"]);

        assert_eq!(repo.search("MARKET").len(), 1);
        assert_eq!(repo.search("").len(), 3);
    }

    #[test]
    fn test_update_moves_email_index() {
        let repo = repo();
        let mut data = request("John", "Doe", "Engineering");
        data.email = "jd@company.com".into();
        data.salary = Decimal::from(80000);

        let updated = repo.update(1, &data).unwrap();
        assert_eq!(updated.salary, Decimal::from(80000));
        assert!(repo.find_by_email("john.doe@company.com").is_none());
        assert_eq!(repo.find_by_email("JD@company.com").unwrap().id, 1);

        // Old address is free again
        assert!(!repo.exists_by_email("john.doe@company.com"));
    }

    #[test]
    fn test_update_rejects_foreign_email() {
        let repo = repo();
        let mut data = request("John", "Doe", "Engineering");
        data.email = "jane.smith@company.com".into();
        assert!(matches!(repo.update(1, &data), Err(RepoError::Duplicate(_))));
        assert!(repo.exists_by_email_and_not_id("jane.smith@company.com", 1));
        assert!(!repo.exists_by_email_and_not_id("jane.smith@company.com", 2));
    }

    #[test]
    fn test_update_missing() {
        let repo = repo();
        let data = request("Nobody", "Here", "IT");
        assert!(matches!(repo.update(99, &data), Err(RepoError::NotFound(_))));
        assert!(!repo.exists_by_email("nobody.here@company.com"));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo();
        assert!(repo.exists(2).await.unwrap());
        assert!(repo.delete(2));
        assert!(!repo.delete(2));
        assert!(!repo.exists(2).await.unwrap());
        assert!(!repo.exists_by_email("jane.smith@company.com"));
    }
}
