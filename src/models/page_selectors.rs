//! 平台页面的选择器集合
//!
//! 平台前端没有稳定的 DOM 约定，每个逻辑元素列出多种写法，越靠前越优先。

use crate::models::selector::{Selector, SelectorSet};

/// 已登录标志（账号菜单等）
pub const AUTHENTICATED_INDICATORS: SelectorSet = SelectorSet::new(
    "authenticated indicator",
    &[
        Selector::css("button[data-testid='logout']"),
        Selector::css(".user-menu"),
        Selector::css(".profile-button"),
        Selector::css("[data-testid='user-menu']"),
        Selector::css(".account-menu"),
    ],
);

pub const LOGIN_EMAIL: SelectorSet = SelectorSet::new(
    "email field",
    &[
        Selector::css("input[type='email']"),
        Selector::css("input[name='email']"),
    ],
);

pub const LOGIN_PASSWORD: SelectorSet = SelectorSet::new(
    "password field",
    &[
        Selector::css("input[type='password']"),
        Selector::css("input[name='password']"),
    ],
);

pub const LOGIN_SUBMIT: SelectorSet = SelectorSet::new(
    "login button",
    &[
        Selector::css("button[type='submit']"),
        Selector::css(".login-button"),
        Selector::css("[data-testid='login-button']"),
    ],
);

/// 投注单容器
pub const SLIP_CONTAINER: SelectorSet = SelectorSet::new(
    "slip container",
    &[
        Selector::css(".slip-builder"),
        Selector::css("[data-testid='slip-builder']"),
        Selector::css(".bet-slip"),
        Selector::css(".slip-container"),
    ],
);

/// 投注单中的选项
pub const PICK_ITEM: SelectorSet = SelectorSet::new(
    "pick item",
    &[
        Selector::css(".pick-item"),
        Selector::css("[data-testid='pick-item']"),
        Selector::css(".slip-pick"),
        Selector::css(".bet-item"),
    ],
);

pub const SUBMIT_CONTROL: SelectorSet = SelectorSet::new(
    "submit control",
    &[
        Selector::css("button[data-testid='submit-slip']"),
        Selector::css(".submit-slip-button"),
        Selector::text("button", "Submit"),
        Selector::css("[data-testid='submit-button']"),
        Selector::css(".submit-button"),
        Selector::css("button[type='submit']"),
    ],
);

/// 注额输入框
pub const UNIT_SIZE_INPUT: SelectorSet = SelectorSet::new(
    "unit size input",
    &[
        Selector::css("input[data-testid='unit-size']"),
        Selector::css("input[name='unitSize']"),
        Selector::css("input[placeholder*='unit']"),
        Selector::css("input[placeholder*='Unit']"),
        Selector::css(".unit-size-input input"),
        Selector::css("[data-testid='unit-input'] input"),
        Selector::css("input[type='number']"),
    ],
);

/// 提交成功提示
pub const SUCCESS_INDICATOR: SelectorSet = SelectorSet::new(
    "success indicator",
    &[
        Selector::css(".success-message"),
        Selector::css("[data-testid='success-message']"),
        Selector::css(".confirmation-message"),
        Selector::css(".submission-success"),
        Selector::text("div", "Success"),
        Selector::text("div", "Submitted"),
    ],
);
