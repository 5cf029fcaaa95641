// キャリア(カテゴリ)登録 - コード・表示名・固定説明文

use crate::error::{QuizError, QuizResult};

/// キャリア1件分の定義
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    /// 識別コード ("advocacia" など)
    pub code: String,
    /// 表示名
    pub display_name: String,
    /// 外部生成に失敗した時にそのまま使う説明文
    pub description: String,
}

impl Category {
    pub fn new(code: &str, display_name: &str, description: &str) -> Self {
        Category {
            code: code.to_string(),
            display_name: display_name.to_string(),
            description: description.to_string(),
        }
    }
}

/// 並び順付きのカテゴリ一覧
///
/// 並び順は同点時の勝者決定に使われるので、登録順を保持する。
#[derive(Clone, Debug)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
}

impl CategoryRegistry {
    /// 空の登録やコード重複は設定エラー
    pub fn new(categories: Vec<Category>) -> QuizResult<Self> {
        if categories.is_empty() {
            return Err(QuizError::configuration(
                "nenhuma carreira cadastrada",
            ));
        }
        for (i, category) in categories.iter().enumerate() {
            if category.code.trim().is_empty() {
                return Err(QuizError::configuration(format!(
                    "carreira na posição {} sem código",
                    i
                )));
            }
            if categories[..i].iter().any(|c| c.code == category.code) {
                return Err(QuizError::configuration(format!(
                    "código de carreira duplicado: {}",
                    category.code
                )));
            }
        }
        Ok(CategoryRegistry { categories })
    }

    /// 法律系キャリア4種の組み込み登録
    pub fn legal_careers() -> Self {
        CategoryRegistry {
            categories: vec![
                Category::new(
                    "advocacia",
                    "Advocacia",
                    "A Advocacia envolve a defesa direta de interesses de clientes, atuação em audiências, \
                     negociação de acordos e elaboração de peças processuais. É uma carreira dinâmica, \
                     com forte componente de argumentação, persuasão e contato próximo com pessoas físicas \
                     e jurídicas.",
                ),
                Category::new(
                    "magistratura",
                    "Magistratura",
                    "A Magistratura é marcada pela imparcialidade, pelo compromisso com a aplicação correta \
                     do Direito e pela responsabilidade de decidir casos que impactam diretamente a vida das pessoas. \
                     Exige profundo conhecimento jurídico, postura ética e serenidade para lidar com conflitos complexos.",
                ),
                Category::new(
                    "ministerio_publico",
                    "Ministério Público",
                    "O Ministério Público atua na defesa da ordem jurídica, do regime democrático e dos interesses \
                     sociais e individuais indisponíveis. Envolve combate à criminalidade, promoção de ações civis \
                     públicas, fiscalização do poder público e proteção de direitos coletivos.",
                ),
                Category::new(
                    "consultoria",
                    "Consultoria Jurídica",
                    "A Consultoria Jurídica concentra-se na prevenção de conflitos, elaboração de contratos, pareceres \
                     e estratégias jurídicas para empresas e organizações. Foca em análise técnica, visão de risco, \
                     compliance e planejamento de médio e longo prazo.",
                ),
            ],
        }
    }

    pub fn as_slice(&self) -> &[Category] {
        &self.categories
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    /// 表示名を取得 (未登録コードはコードをそのまま返す)
    pub fn display_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.get(code).map(|c| c.display_name.as_str()).unwrap_or(code)
    }

    /// 固定説明文を取得 (未登録コードは空文字)
    pub fn description(&self, code: &str) -> &str {
        self.get(code).map(|c| c.description.as_str()).unwrap_or("")
    }
}
