// プロンプトテンプレートを管理するモジュール
use anyhow::{Result, anyhow};
use std::fs;
use std::path::Path;

use crate::careers::Category;

// テンプレート変数のタイプ
pub type TemplateVariables = Vec<(String, String)>;

/// キャリア説明生成用のデフォルトテンプレート
pub const CAREER_DESCRIPTION_TEMPLATE: &str = "Você é um orientador vocacional jurídico. \
Explique de forma clara e objetiva a carreira de {{career_name}} para um estudante de Direito. \
Use linguagem acessível, em tom encorajador. \
Base: {{base_description}} \
Estruture em: visão geral; principais atividades; habilidades importantes; perfil ideal; desafios.";

// テンプレートをファイルから読み込む
pub fn load_template(template_path: &Path) -> Result<String> {
    if !template_path.exists() {
        return Err(anyhow!(
            "テンプレートファイル {} が見つかりません",
            template_path.display()
        ));
    }

    let template_content = fs::read_to_string(template_path).map_err(|e| {
        anyhow!(
            "テンプレートファイル {} の読み込みに失敗: {}",
            template_path.display(),
            e
        )
    })?;

    Ok(template_content)
}

// テンプレート内の変数を置換
pub fn render_template(template: &str, variables: &TemplateVariables) -> String {
    let mut rendered = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        rendered = rendered.replace(&placeholder, value);
    }

    rendered
}

/// キャリア説明のプロンプトを組み立てる
pub fn career_prompt(template: &str, category: &Category) -> String {
    let variables: TemplateVariables = vec![
        ("career_code".to_string(), category.code.clone()),
        ("career_name".to_string(), category.display_name.clone()),
        ("base_description".to_string(), category.description.clone()),
    ];
    render_template(template, &variables)
}
