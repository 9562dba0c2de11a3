//! Optimization Score
//!
//! 生成されたメタデータの文字数とキーワード出現による加点式スコア (0-100)

use serde::{Deserialize, Serialize};

/// 基本スコア
const BASE_SCORE: u32 = 50;
/// スコア上限
const MAX_SCORE: u32 = 100;

/// スコアグレード（管理画面の色分けに対応）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ScoreGrade {
    /// 80以上
    Good,
    /// 60以上
    Fair,
    /// 60未満
    Poor,
}

impl ScoreGrade {
    /// スコアからグレードを判定
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => ScoreGrade::Good,
            60..=79 => ScoreGrade::Fair,
            _ => ScoreGrade::Poor,
        }
    }

    /// 表示色
    pub fn color(&self) -> &'static str {
        match self {
            ScoreGrade::Good => "#4caf50",
            ScoreGrade::Fair => "#ff9800",
            ScoreGrade::Poor => "#f44336",
        }
    }
}

/// 個別チェックの結果
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreCheck {
    /// チェック名（例: "titleLength"）
    pub name: String,
    /// 加点
    pub points: u32,
}

/// スコア内訳
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// 最終スコア
    pub score: u8,
    /// 実施したチェック
    pub checks: Vec<ScoreCheck>,
}

impl ScoreBreakdown {
    /// グレードを取得
    pub fn grade(&self) -> ScoreGrade {
        ScoreGrade::from_score(self.score)
    }
}

impl ScoreCheck {
    fn new(name: &str, points: u32) -> Self {
        Self {
            name: name.to_string(),
            points,
        }
    }
}

fn contains_keyword(text: &str, keyword: &str) -> bool {
    !keyword.is_empty() && text.to_lowercase().contains(&keyword.to_lowercase())
}

fn length_points(len: usize, optimal: (usize, usize), acceptable: (usize, usize)) -> u32 {
    if (optimal.0..=optimal.1).contains(&len) {
        10
    } else if (acceptable.0..=acceptable.1).contains(&len) {
        5
    } else {
        0
    }
}

/// スコアと内訳を計算
pub fn score_breakdown(title: &str, description: &str, keyword: &str) -> ScoreBreakdown {
    let mut checks = Vec::new();

    if !title.is_empty() {
        checks.push(ScoreCheck::new(
            "titleLength",
            length_points(title.chars().count(), (50, 60), (40, 65)),
        ));
        checks.push(ScoreCheck::new(
            "titleKeyword",
            if contains_keyword(title, keyword) { 10 } else { 0 },
        ));
    }

    if !description.is_empty() {
        checks.push(ScoreCheck::new(
            "descriptionLength",
            length_points(description.chars().count(), (140, 155), (120, 170)),
        ));
        checks.push(ScoreCheck::new(
            "descriptionKeyword",
            if contains_keyword(description, keyword) { 10 } else { 0 },
        ));
    }

    let total = BASE_SCORE + checks.iter().map(|c| c.points).sum::<u32>();
    // 上限で切り詰めているため u8 に収まる
    let score = total.min(MAX_SCORE) as u8;

    ScoreBreakdown { score, checks }
}

/// 最適化スコアを計算
pub fn calculate_score(title: &str, description: &str, keyword: &str) -> u8 {
    score_breakdown(title, description, keyword).score
}
