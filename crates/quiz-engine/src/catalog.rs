//! Lesson Catalog
//!
//! Lessons and user assignments loaded from configuration. Which lessons a
//! learner sees is decided here, from their role and assignment list.

use academy_core::{AcademyError, Category, Difficulty, Lesson, Role, UserContext};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::authoring::{validate_lesson, LessonDraft};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// Per-user configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserEntry {
    #[serde(default)]
    pub role: Role,
    /// Lesson ids in display order; ignored for admins, who see everything
    #[serde(default)]
    pub lessons: Vec<u32>,
}

/// Optional narrowing of a lesson listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LessonFilter {
    pub category: Option<Category>,
    pub difficulty: Option<Difficulty>,
}

impl LessonFilter {
    pub fn matches(&self, lesson: &Lesson) -> bool {
        self.category.map_or(true, |c| c == lesson.category)
            && self.difficulty.map_or(true, |d| d == lesson.difficulty)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonCatalog {
    lessons: Vec<Lesson>,
    #[serde(default)]
    users: BTreeMap<String, UserEntry>,
}

impl LessonCatalog {
    /// Build and validate a catalog
    pub fn new(lessons: Vec<Lesson>, users: BTreeMap<String, UserEntry>) -> Result<Self, AcademyError> {
        let catalog = Self { lessons, users };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The sample catalog shipped with the crate
    pub fn builtin() -> Result<Self, AcademyError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(json: &str) -> Result<Self, AcademyError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, AcademyError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| AcademyError::Storage(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            "Loaded catalog from {}: {} lessons, {} users",
            path.display(),
            catalog.lessons.len(),
            catalog.users.len()
        );
        Ok(catalog)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AcademyError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    /// Ids are unique, every lesson is well formed and every assignment
    /// points at an existing lesson.
    pub fn validate(&self) -> Result<(), AcademyError> {
        let mut seen = HashSet::new();
        for lesson in &self.lessons {
            if !seen.insert(lesson.id) {
                return Err(AcademyError::InvalidLesson(format!("duplicate lesson id {}", lesson.id)));
            }
            validate_lesson(lesson)?;
        }

        for (name, entry) in &self.users {
            if let Some(&missing) = entry.lessons.iter().find(|id| !seen.contains(id)) {
                tracing::warn!("User '{}' is assigned unknown lesson {}", name, missing);
                return Err(AcademyError::LessonNotFound(missing));
            }
        }
        Ok(())
    }

    /// All lessons, in catalog order
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    pub fn get(&self, id: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|l| l.id == id)
    }

    pub fn resolve_user(&self, name: &str) -> Result<UserContext, AcademyError> {
        self.users
            .get(name)
            .map(|entry| UserContext::new(name, entry.role))
            .ok_or_else(|| AcademyError::UnknownUser(name.to_string()))
    }

    /// Every configured user, sorted by name
    pub fn users(&self) -> impl Iterator<Item = UserContext> + '_ {
        self.users
            .iter()
            .map(|(name, entry)| UserContext::new(name.clone(), entry.role))
    }

    /// Lessons the user may open: all of them for an admin, the assigned
    /// ones in assignment order for a student.
    pub fn visible_lessons(&self, user: &UserContext) -> Vec<&Lesson> {
        if user.is_admin() {
            return self.lessons.iter().collect();
        }
        self.users
            .get(&user.name)
            .map(|entry| entry.lessons.iter().filter_map(|&id| self.get(id)).collect())
            .unwrap_or_default()
    }

    pub fn filtered(&self, user: &UserContext, filter: LessonFilter) -> Vec<&Lesson> {
        self.visible_lessons(user)
            .into_iter()
            .filter(|l| filter.matches(l))
            .collect()
    }

    pub fn by_category(&self, user: &UserContext, category: Category) -> Vec<&Lesson> {
        self.filtered(user, LessonFilter { category: Some(category), difficulty: None })
    }

    pub fn by_difficulty(&self, user: &UserContext, difficulty: Difficulty) -> Vec<&Lesson> {
        self.filtered(user, LessonFilter { category: None, difficulty: Some(difficulty) })
    }

    /// Look up a lesson the user is allowed to open.
    pub fn lesson_for(&self, user: &UserContext, id: u32) -> Result<&Lesson, AcademyError> {
        let lesson = self.get(id).ok_or(AcademyError::LessonNotFound(id))?;
        if self.visible_lessons(user).iter().any(|l| l.id == id) {
            Ok(lesson)
        } else {
            Err(AcademyError::Unauthorized(format!(
                "lesson {} is not assigned to '{}'",
                id, user.name
            )))
        }
    }

    /// Number of lessons the user is expected to complete
    pub fn assigned_count(&self, user: &UserContext) -> usize {
        self.visible_lessons(user).len()
    }

    /// One past the highest id in use, `None` once `u32::MAX` is taken
    pub fn next_id(&self) -> Option<u32> {
        self.lessons.iter().map(|l| l.id).max().unwrap_or(0).checked_add(1)
    }

    /// Add an authored lesson. Only admins may author.
    pub fn add_lesson(&mut self, author: &UserContext, draft: LessonDraft) -> Result<&Lesson, AcademyError> {
        if !author.is_admin() {
            tracing::warn!("Rejected lesson authored by non-admin '{}'", author.name);
            return Err(AcademyError::Unauthorized(format!(
                "'{}' may not author lessons",
                author.name
            )));
        }

        let id = self
            .next_id()
            .ok_or_else(|| AcademyError::InvalidLesson("lesson ids exhausted".to_string()))?;
        let lesson = draft.into_lesson(id)?;
        tracing::info!("'{}' added lesson {} '{}'", author.name, lesson.id, lesson.title);
        self.lessons.push(lesson);
        Ok(&self.lessons[self.lessons.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::tests::{question, two_question_lesson};

    fn admin() -> UserContext {
        UserContext::new("admin", Role::Admin)
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = LessonCatalog::builtin().unwrap();

        assert_eq!(catalog.lessons().len(), 6);
        assert_eq!(catalog.get(3).unwrap().category, Category::RiskManagement);
        assert_eq!(catalog.users().count(), 3);
    }

    #[test]
    fn test_admin_sees_everything() {
        let catalog = LessonCatalog::builtin().unwrap();
        let admin = catalog.resolve_user("admin").unwrap();

        assert!(admin.is_admin());
        assert_eq!(catalog.visible_lessons(&admin).len(), 6);
    }

    #[test]
    fn test_student_sees_assigned_in_order() {
        let catalog = LessonCatalog::builtin().unwrap();
        let anna = catalog.resolve_user("anna").unwrap();

        let ids: Vec<u32> = catalog.visible_lessons(&anna).iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert!(catalog.lesson_for(&anna, 3).is_ok());
        assert!(matches!(catalog.lesson_for(&anna, 2), Err(AcademyError::Unauthorized(_))));
        assert_eq!(catalog.lesson_for(&anna, 99), Err(AcademyError::LessonNotFound(99)));
    }

    #[test]
    fn test_unknown_user() {
        let catalog = LessonCatalog::builtin().unwrap();
        assert_eq!(
            catalog.resolve_user("mallory"),
            Err(AcademyError::UnknownUser("mallory".to_string()))
        );

        let stranger = UserContext::new("mallory", Role::Student);
        assert!(catalog.visible_lessons(&stranger).is_empty());
    }

    #[test]
    fn test_filters() {
        let catalog = LessonCatalog::builtin().unwrap();
        let admin = admin();

        let technical = catalog.by_category(&admin, Category::TechnicalAnalysis);
        assert_eq!(technical.len(), 3);

        let advanced = catalog.by_difficulty(&admin, Difficulty::Advanced);
        assert!(advanced.iter().all(|l| l.difficulty == Difficulty::Advanced));

        let both = catalog.filtered(
            &admin,
            LessonFilter {
                category: Some(Category::TechnicalAnalysis),
                difficulty: Some(Difficulty::Beginner),
            },
        );
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, 1);
    }

    #[test]
    fn test_rejects_duplicate_ids_and_dangling_assignments() {
        let lesson = two_question_lesson();
        let dup = LessonCatalog::new(vec![lesson.clone(), lesson.clone()], BTreeMap::new());
        assert!(matches!(dup, Err(AcademyError::InvalidLesson(_))));

        let mut users = BTreeMap::new();
        users.insert("x".to_string(), UserEntry { role: Role::Student, lessons: vec![5] });
        assert_eq!(
            LessonCatalog::new(vec![lesson], users),
            Err(AcademyError::LessonNotFound(5))
        );
    }

    #[test]
    fn test_add_lesson_requires_admin() {
        let mut catalog = LessonCatalog::builtin().unwrap();
        let draft = LessonDraft {
            title: "Bollinger Bands".to_string(),
            description: "Volatility envelopes".to_string(),
            video_ref: "https://example.com/bb".to_string(),
            category: Category::TechnicalAnalysis,
            difficulty: Some(Difficulty::Intermediate),
            questions: vec![question("Middle band?", 2)],
        };

        let student = UserContext::new("anna", Role::Student);
        assert!(matches!(
            catalog.add_lesson(&student, draft.clone()),
            Err(AcademyError::Unauthorized(_))
        ));

        let lesson = catalog.add_lesson(&admin(), draft).unwrap();
        assert_eq!(lesson.id, 7);
        assert_eq!(catalog.lessons().len(), 7);
        assert_eq!(catalog.next_id(), Some(8));
    }

    #[test]
    fn test_add_lesson_when_ids_exhausted() {
        let mut lesson = two_question_lesson();
        lesson.id = u32::MAX;
        let mut catalog = LessonCatalog::new(vec![lesson], BTreeMap::new()).unwrap();
        assert_eq!(catalog.next_id(), None);

        let draft = LessonDraft {
            title: "RSI".to_string(),
            description: String::new(),
            video_ref: "https://example.com/rsi".to_string(),
            category: Category::TechnicalAnalysis,
            difficulty: None,
            questions: vec![question("Overbought above?", 1)],
        };
        assert_eq!(
            catalog.add_lesson(&admin(), draft).map(|l| l.id),
            Err(AcademyError::InvalidLesson("lesson ids exhausted".to_string()))
        );
        assert_eq!(catalog.lessons().len(), 1);
    }

    #[test]
    fn test_save_and_load() {
        let catalog = LessonCatalog::builtin().unwrap();
        let path = std::env::temp_dir().join(format!("catalog-{}.json", uuid::Uuid::new_v4()));

        catalog.save(&path).unwrap();
        let loaded = LessonCatalog::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LessonCatalog::load("/nonexistent/catalog.json").unwrap_err();
        assert!(matches!(err, AcademyError::Storage(_)));
    }
}
