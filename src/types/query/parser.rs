//! WHERE 条件解析器
//!
//! 把调用者写的条件文本（例如 `age > 30 AND name LIKE 'A%'`）解析为
//! [`QueryConditionGroup`]。只接受受限语法：
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ( OR and_expr )*
//! and_expr   := not_expr ( AND not_expr )*
//! not_expr   := NOT not_expr | primary
//! primary    := '(' expr ')' | comparison
//! comparison := column cmp_op literal
//!             | column IS [NOT] NULL
//!             | column [NOT] LIKE string
//!             | column [NOT] IN '(' literal (',' literal)* ')'
//!             | column [NOT] BETWEEN literal AND literal
//! cmp_op     := '=' | '==' | '!=' | '<>' | '<' | '<=' | '>' | '>='
//! column     := bare_ident | "double quoted" | [bracketed] | `backticked`
//! literal    := ['-'] number | 'string' | TRUE | FALSE
//! ```
//!
//! 解析结果中的字面量之后以绑定参数的方式传给数据库，列名经过表结构校验后再加引号拼接。

use super::{LogicalOperator, QueryCondition, QueryConditionGroup, QueryOperator};
use crate::error::{SheetDbError, SheetDbResult};
use crate::types::DataValue;

/// 括号嵌套的最大深度
const MAX_DEPTH: usize = 32;

/// 条件文本的最大长度
const MAX_CONDITION_LENGTH: usize = 4096;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    /// 标识符（裸标识符或带引号的标识符）
    Ident { name: String, quoted: bool },
    Number(String),
    Str(String),
    Cmp(QueryOperator),
    Keyword(Keyword),
    LParen,
    RParen,
    Comma,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    And,
    Or,
    Not,
    Is,
    Null,
    Like,
    In,
    Between,
    True,
    False,
}

impl Keyword {
    fn from_word(word: &str) -> Option<Self> {
        let keyword = match word.to_ascii_uppercase().as_str() {
            "AND" => Keyword::And,
            "OR" => Keyword::Or,
            "NOT" => Keyword::Not,
            "IS" => Keyword::Is,
            "NULL" => Keyword::Null,
            "LIKE" => Keyword::Like,
            "IN" => Keyword::In,
            "BETWEEN" => Keyword::Between,
            "TRUE" => Keyword::True,
            "FALSE" => Keyword::False,
            _ => return None,
        };
        Some(keyword)
    }
}

/// 解析条件文本
///
/// # 参数
/// * `operation` - 调用方操作名，用于错误上下文
/// * `condition` - 条件文本
pub fn parse_condition(operation: &str, condition: &str) -> SheetDbResult<QueryConditionGroup> {
    if condition.len() > MAX_CONDITION_LENGTH {
        return Err(invalid(
            operation,
            format!("条件长度不能超过{}个字符", MAX_CONDITION_LENGTH),
        ));
    }

    let tokens = tokenize(operation, condition)?;
    if tokens.is_empty() {
        return Err(invalid(operation, "条件不能为空".to_string()));
    }

    let mut parser = Parser {
        operation,
        tokens,
        pos: 0,
        depth: 0,
    };
    let group = parser.parse_or()?;

    if let Some(token) = parser.peek() {
        return Err(invalid(operation, format!("条件末尾存在多余内容: {}", describe(token))));
    }

    Ok(group)
}

fn invalid(operation: &str, reason: String) -> SheetDbError {
    SheetDbError::invalid_parameter(operation, "condition", &reason)
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident { name, .. } => format!("标识符 '{}'", name),
        Token::Number(n) => format!("数字 {}", n),
        Token::Str(s) => format!("字符串 '{}'", s),
        Token::Cmp(op) => format!("比较符 {:?}", op),
        Token::Keyword(k) => format!("关键字 {:?}", k),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Minus => "'-'".to_string(),
    }
}

fn tokenize(operation: &str, input: &str) -> SheetDbResult<Vec<Token>> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => {
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '=' => {
                // `=` 与 `==` 等价
                i += if chars.get(i + 1) == Some(&'=') { 2 } else { 1 };
                tokens.push(Token::Cmp(QueryOperator::Eq));
            }
            '!' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Cmp(QueryOperator::Ne));
                    i += 2;
                } else {
                    return Err(invalid(operation, format!("位置 {} 处的 '!' 后必须跟 '='", i)));
                }
            }
            '<' => match chars.get(i + 1) {
                Some('=') => {
                    tokens.push(Token::Cmp(QueryOperator::Lte));
                    i += 2;
                }
                Some('>') => {
                    tokens.push(Token::Cmp(QueryOperator::Ne));
                    i += 2;
                }
                _ => {
                    tokens.push(Token::Cmp(QueryOperator::Lt));
                    i += 1;
                }
            },
            '>' => {
                if chars.get(i + 1) == Some(&'=') {
                    tokens.push(Token::Cmp(QueryOperator::Gte));
                    i += 2;
                } else {
                    tokens.push(Token::Cmp(QueryOperator::Gt));
                    i += 1;
                }
            }
            '\'' => {
                let (text, next) = read_delimited(operation, &chars, i, '\'', '\'')?;
                tokens.push(Token::Str(text));
                i = next;
            }
            '"' => {
                let (name, next) = read_delimited(operation, &chars, i, '"', '"')?;
                tokens.push(Token::Ident { name, quoted: true });
                i = next;
            }
            '`' => {
                let (name, next) = read_delimited(operation, &chars, i, '`', '`')?;
                tokens.push(Token::Ident { name, quoted: true });
                i = next;
            }
            '[' => {
                let (name, next) = read_delimited(operation, &chars, i, '[', ']')?;
                tokens.push(Token::Ident { name, quoted: true });
                i = next;
            }
            c if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit())) => {
                let (number, next) = read_number(operation, &chars, i)?;
                tokens.push(Token::Number(number));
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                match Keyword::from_word(&word) {
                    Some(keyword) => tokens.push(Token::Keyword(keyword)),
                    None => tokens.push(Token::Ident {
                        name: word,
                        quoted: false,
                    }),
                }
            }
            other => {
                return Err(invalid(
                    operation,
                    format!("位置 {} 处存在不允许的字符 '{}'", i, other),
                ));
            }
        }
    }

    Ok(tokens)
}

/// 读取定界内容，定界符重复两次表示转义（`'it''s'`）
fn read_delimited(
    operation: &str,
    chars: &[char],
    start: usize,
    open: char,
    close: char,
) -> SheetDbResult<(String, usize)> {
    let mut text = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == close {
            // `]` 没有转义形式，其余定界符以双写转义
            if open == close && chars.get(i + 1) == Some(&close) {
                text.push(close);
                i += 2;
                continue;
            }
            return Ok((text, i + 1));
        }
        text.push(c);
        i += 1;
    }
    Err(invalid(
        operation,
        format!("位置 {} 处的 {} 没有闭合", start, open),
    ))
}

fn read_number(operation: &str, chars: &[char], start: usize) -> SheetDbResult<(String, usize)> {
    let mut i = start;
    let mut seen_dot = false;
    let mut seen_exp = false;

    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            i += 1;
        } else if c == '.' && !seen_dot && !seen_exp {
            seen_dot = true;
            i += 1;
        } else if (c == 'e' || c == 'E') && !seen_exp {
            seen_exp = true;
            i += 1;
            if matches!(chars.get(i), Some('+') | Some('-')) {
                i += 1;
            }
            if !chars.get(i).is_some_and(|d| d.is_ascii_digit()) {
                return Err(invalid(operation, format!("位置 {} 处的数字指数不完整", start)));
            }
        } else {
            break;
        }
    }

    // 数字后面紧跟字母（如 `30abc`）视为非法
    if chars.get(i).is_some_and(|c| c.is_alphabetic() || *c == '_') {
        return Err(invalid(operation, format!("位置 {} 处的数字格式无效", start)));
    }

    Ok((chars[start..i].iter().collect(), i))
}

struct Parser<'a> {
    operation: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.peek() == Some(&Token::Keyword(keyword)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> SheetDbResult<()> {
        if self.eat_keyword(keyword) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("{:?}", keyword).to_uppercase()))
        }
    }

    fn unexpected(&self, expected: &str) -> SheetDbError {
        let found = match self.peek() {
            Some(token) => describe(token),
            None => "条件结尾".to_string(),
        };
        invalid(self.operation, format!("期望 {}，实际为 {}", expected, found))
    }

    fn parse_or(&mut self) -> SheetDbResult<QueryConditionGroup> {
        let mut conditions = vec![self.parse_and()?];
        while self.eat_keyword(Keyword::Or) {
            conditions.push(self.parse_and()?);
        }
        Ok(combine(LogicalOperator::Or, conditions))
    }

    fn parse_and(&mut self) -> SheetDbResult<QueryConditionGroup> {
        let mut conditions = vec![self.parse_not()?];
        while self.eat_keyword(Keyword::And) {
            conditions.push(self.parse_not()?);
        }
        Ok(combine(LogicalOperator::And, conditions))
    }

    fn parse_not(&mut self) -> SheetDbResult<QueryConditionGroup> {
        if self.eat_keyword(Keyword::Not) {
            self.enter()?;
            let inner = self.parse_not()?;
            self.depth -= 1;
            return Ok(QueryConditionGroup::Not(Box::new(inner)));
        }
        self.parse_primary()
    }

    fn enter(&mut self) -> SheetDbResult<()> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(invalid(
                self.operation,
                format!("条件嵌套层数不能超过{}", MAX_DEPTH),
            ));
        }
        Ok(())
    }

    fn parse_primary(&mut self) -> SheetDbResult<QueryConditionGroup> {
        match self.peek() {
            Some(Token::LParen) => {
                self.pos += 1;
                self.enter()?;
                let inner = self.parse_or()?;
                self.depth -= 1;
                match self.next() {
                    Some(Token::RParen) => Ok(inner),
                    _ => {
                        self.pos = self.pos.saturating_sub(1);
                        Err(self.unexpected("')'"))
                    }
                }
            }
            Some(Token::Ident { .. }) => self.parse_comparison(),
            _ => Err(self.unexpected("列名或 '('")),
        }
    }

    fn parse_comparison(&mut self) -> SheetDbResult<QueryConditionGroup> {
        let field = match self.next() {
            Some(Token::Ident { name, .. }) => name,
            _ => return Err(self.unexpected("列名")),
        };
        if field.is_empty() {
            return Err(invalid(self.operation, "列名不能为空".to_string()));
        }

        let (operator, values) = match self.peek().cloned() {
            Some(Token::Cmp(operator)) => {
                self.pos += 1;
                let value = self.parse_literal()?;
                (operator, vec![value])
            }
            Some(Token::Keyword(Keyword::Is)) => {
                self.pos += 1;
                let negated = self.eat_keyword(Keyword::Not);
                self.expect_keyword(Keyword::Null)?;
                let operator = if negated {
                    QueryOperator::IsNotNull
                } else {
                    QueryOperator::IsNull
                };
                (operator, Vec::new())
            }
            Some(Token::Keyword(Keyword::Not)) => {
                self.pos += 1;
                self.parse_negatable(true)?
            }
            Some(Token::Keyword(Keyword::Like | Keyword::In | Keyword::Between)) => {
                self.parse_negatable(false)?
            }
            _ => return Err(self.unexpected("比较符、IS、LIKE、IN 或 BETWEEN")),
        };

        Ok(QueryConditionGroup::Single(QueryCondition {
            field,
            operator,
            values,
        }))
    }

    fn parse_negatable(&mut self, negated: bool) -> SheetDbResult<(QueryOperator, Vec<DataValue>)> {
        match self.next() {
            Some(Token::Keyword(Keyword::Like)) => match self.next() {
                Some(Token::Str(pattern)) => {
                    let operator = if negated {
                        QueryOperator::NotLike
                    } else {
                        QueryOperator::Like
                    };
                    Ok((operator, vec![DataValue::String(pattern)]))
                }
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    Err(self.unexpected("LIKE 模式字符串"))
                }
            },
            Some(Token::Keyword(Keyword::In)) => {
                if self.next() != Some(Token::LParen) {
                    self.pos = self.pos.saturating_sub(1);
                    return Err(self.unexpected("'('"));
                }
                let mut values = vec![self.parse_literal()?];
                loop {
                    match self.next() {
                        Some(Token::Comma) => values.push(self.parse_literal()?),
                        Some(Token::RParen) => break,
                        _ => {
                            self.pos = self.pos.saturating_sub(1);
                            return Err(self.unexpected("',' 或 ')'"));
                        }
                    }
                }
                let operator = if negated {
                    QueryOperator::NotIn
                } else {
                    QueryOperator::In
                };
                Ok((operator, values))
            }
            Some(Token::Keyword(Keyword::Between)) => {
                let low = self.parse_literal()?;
                self.expect_keyword(Keyword::And)?;
                let high = self.parse_literal()?;
                let operator = if negated {
                    QueryOperator::NotBetween
                } else {
                    QueryOperator::Between
                };
                Ok((operator, vec![low, high]))
            }
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.unexpected("LIKE、IN 或 BETWEEN"))
            }
        }
    }

    fn parse_literal(&mut self) -> SheetDbResult<DataValue> {
        match self.next() {
            Some(Token::Minus) => match self.next() {
                Some(Token::Number(number)) => self.number_value(&format!("-{}", number)),
                _ => {
                    self.pos = self.pos.saturating_sub(1);
                    Err(self.unexpected("数字"))
                }
            },
            Some(Token::Number(number)) => self.number_value(&number),
            Some(Token::Str(text)) => Ok(DataValue::String(text)),
            Some(Token::Keyword(Keyword::True)) => Ok(DataValue::Bool(true)),
            Some(Token::Keyword(Keyword::False)) => Ok(DataValue::Bool(false)),
            Some(Token::Keyword(Keyword::Null)) => Err(invalid(
                self.operation,
                "不能与 NULL 比较，请使用 IS NULL / IS NOT NULL".to_string(),
            )),
            Some(Token::Ident { name, .. }) => Err(invalid(
                self.operation,
                format!("右侧必须是字面量，不支持与列 '{}' 比较；字符串请使用单引号", name),
            )),
            _ => {
                self.pos = self.pos.saturating_sub(1);
                Err(self.unexpected("字面量"))
            }
        }
    }

    fn number_value(&self, text: &str) -> SheetDbResult<DataValue> {
        let is_integer = !text.contains(['.', 'e', 'E']);
        if is_integer {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(DataValue::Int(i));
            }
        }
        text.parse::<f64>()
            .map(DataValue::Float)
            .map_err(|_| invalid(self.operation, format!("无效的数字: {}", text)))
    }
}

fn combine(operator: LogicalOperator, mut conditions: Vec<QueryConditionGroup>) -> QueryConditionGroup {
    if conditions.len() == 1 {
        conditions.remove(0)
    } else {
        QueryConditionGroup::Group {
            operator,
            conditions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(field: &str, operator: QueryOperator, values: Vec<DataValue>) -> QueryConditionGroup {
        QueryConditionGroup::Single(QueryCondition {
            field: field.to_string(),
            operator,
            values,
        })
    }

    #[test]
    fn test_simple_comparison() {
        let group = parse_condition("select_where", "age > 30").unwrap();
        assert_eq!(group, single("age", QueryOperator::Gt, vec![DataValue::Int(30)]));

        let group = parse_condition("select_where", "score <= -2.5").unwrap();
        assert_eq!(group, single("score", QueryOperator::Lte, vec![DataValue::Float(-2.5)]));

        let group = parse_condition("select_where", "name <> 'O''Brien'").unwrap();
        assert_eq!(
            group,
            single("name", QueryOperator::Ne, vec![DataValue::String("O'Brien".into())])
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        let group = parse_condition("w", "\"date of hire\" >= '2020-01-01'").unwrap();
        assert_eq!(group.referenced_fields(), vec!["date of hire"]);

        let group = parse_condition("w", "[first name] = 'Anna' OR `in` = 1").unwrap();
        assert_eq!(group.referenced_fields(), vec!["first name", "in"]);
    }

    #[test]
    fn test_precedence_and_grouping() {
        let group = parse_condition("w", "a = 1 OR b = 2 AND c = 3").unwrap();
        match group {
            QueryConditionGroup::Group { operator, conditions } => {
                assert_eq!(operator, LogicalOperator::Or);
                assert_eq!(conditions.len(), 2);
                assert!(matches!(
                    conditions[1],
                    QueryConditionGroup::Group { operator: LogicalOperator::And, .. }
                ));
            }
            other => panic!("期望 OR 组合，实际: {:?}", other),
        }

        let group = parse_condition("w", "NOT (a = 1 or b = 2)").unwrap();
        assert!(matches!(group, QueryConditionGroup::Not(_)));
    }

    #[test]
    fn test_special_predicates() {
        assert_eq!(
            parse_condition("w", "email IS NOT NULL").unwrap(),
            single("email", QueryOperator::IsNotNull, vec![])
        );
        assert_eq!(
            parse_condition("w", "department in ('IT', 'HR')").unwrap(),
            single(
                "department",
                QueryOperator::In,
                vec![DataValue::from("IT"), DataValue::from("HR")]
            )
        );
        assert_eq!(
            parse_condition("w", "salary NOT BETWEEN 45000 AND 60000").unwrap(),
            single(
                "salary",
                QueryOperator::NotBetween,
                vec![DataValue::Int(45000), DataValue::Int(60000)]
            )
        );
        assert_eq!(
            parse_condition("w", "name like 'A%'").unwrap(),
            single("name", QueryOperator::Like, vec![DataValue::from("A%")])
        );
        assert_eq!(
            parse_condition("w", "active = TRUE").unwrap(),
            single("active", QueryOperator::Eq, vec![DataValue::Bool(true)])
        );
    }

    #[test]
    fn test_rejects_injection_and_unsupported_shapes() {
        let rejected = [
            "",
            "   ",
            "1=1",
            "age > 30; DROP TABLE T",
            "age > 30 --",
            "age > (SELECT 1)",
            "age > other_column",
            "age = NULL",
            "length(name) > 3",
            "age > 30 age < 40",
            "(age > 30",
            "name = 'unterminated",
            "age > 30abc",
            "age IN ()",
            "name LIKE 5",
            "* = 1",
        ];
        for condition in rejected {
            let err = parse_condition("select_where", condition).unwrap_err();
            assert_eq!(err.kind(), "InvalidParameter", "应拒绝: {:?}", condition);
        }
    }

    #[test]
    fn test_depth_limit() {
        let deep = format!("{}a = 1{}", "(".repeat(MAX_DEPTH + 1), ")".repeat(MAX_DEPTH + 1));
        assert!(parse_condition("w", &deep).is_err());

        let ok = format!("{}a = 1{}", "(".repeat(4), ")".repeat(4));
        assert!(parse_condition("w", &ok).is_ok());
    }
}
