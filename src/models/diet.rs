//! Diet plan model.

use serde::{Deserialize, Serialize};

/// Diet plan stored in the `diets` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diet {
    pub id: String,
    #[serde(rename = "dietpref")]
    pub diet_preference: String,
    /// Activity level
    pub activity: String,
    #[serde(rename = "yourdiet")]
    pub your_diet: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct NewDiet {
    pub diet_preference: String,
    pub activity: String,
    pub your_diet: String,
}

impl NewDiet {
    pub fn into_diet(self, id: String, created_at: String) -> Diet {
        Diet {
            id,
            diet_preference: self.diet_preference,
            activity: self.activity,
            your_diet: self.your_diet,
            created_at,
        }
    }

    /// Overwrite the editable fields of an existing plan.
    pub fn apply(self, diet: &mut Diet) {
        diet.diet_preference = self.diet_preference;
        diet.activity = self.activity;
        diet.your_diet = self.your_diet;
    }
}
