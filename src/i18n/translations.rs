//! Static translation tables.

use super::Language;

const AM: &[(&str, &str)] = &[
    ("admin_required", "Այս գործողությունը հասանելի է միայն ադմինիստրատորին։"),
    ("delete_fail", "Ջնջելիս սխալ տեղի ունեցավ"),
    ("delete_success", "Միջոցառումը հաջողությամբ ջնջվեց։"),
    ("error_no_images", "Խնդրում ենք ընտրել առնվազն մեկ նկար։"),
    ("error_not_image", "Ընտրված ֆայլը նկար չէ։"),
    ("error_required_fields", "Խնդրում ենք լրացնել բոլոր պարտադիր դաշտերը։"),
    ("event_add_fail", "Միջոցառումն ավելացնելիս սխալ տեղի ունեցավ"),
    ("event_add_success", "Միջոցառումը հաջողությամբ ավելացվեց։"),
    ("fetch_error", "Միջոցառումները բեռնելիս սխալ տեղի ունեցավ"),
    ("form_error", "Ուղարկելիս սխալ տեղի ունեցավ"),
    ("form_success", "Շնորհակալություն, Ձեր կարծիքն ուղարկված է։"),
    ("login_fail", "Մուտքի սխալ"),
    ("logout_fail", "Ելքի սխալ"),
    ("logout_success", "Դուրս եկաք։"),
    ("news_empty", "Նորություններ չեն գտնվել այս պահին։"),
    ("news_error", "Նորություններ բեռնելիս սխալ"),
    ("record_missing", "Գրառումն արդեն ջնջված է"),
    ("testimonial_default_text", "Կարծիքը բացակայում է"),
    ("testimonial_delete_fail", "Չհաջողվեց ջնջել կարծիքը"),
    ("testimonial_delete_success", "Կարծիքը ջնջվեց։"),
    ("testimonial_fetch_error", "Կարծիքները բեռնելիս սխալ տեղի ունեցավ"),
    ("upload_error", "Նկարի բեռնման սխալ"),
    ("upload_success", "Նկարը հաջողությամբ թարմացվեց։"),
    ("month_0", "հունվարի"),
    ("month_1", "փետրվարի"),
    ("month_2", "մարտի"),
    ("month_3", "ապրիլի"),
    ("month_4", "մայիսի"),
    ("month_5", "հունիսի"),
    ("month_6", "հուլիսի"),
    ("month_7", "օգոստոսի"),
    ("month_8", "սեպտեմբերի"),
    ("month_9", "հոկտեմբերի"),
    ("month_10", "նոյեմբերի"),
    ("month_11", "դեկտեմբերի"),
];

const EN: &[(&str, &str)] = &[
    ("admin_required", "Only the administrator can do this."),
    ("delete_fail", "Deletion failed"),
    ("delete_success", "The event was deleted."),
    ("error_no_images", "Please select at least one image."),
    ("error_not_image", "The selected file is not an image."),
    ("error_required_fields", "Please fill in all required fields."),
    ("event_add_fail", "Adding the event failed"),
    ("event_add_success", "The event was added."),
    ("fetch_error", "Loading events failed"),
    ("form_error", "Sending failed"),
    ("form_success", "Thank you, your testimonial was sent."),
    ("login_fail", "Sign-in failed"),
    ("logout_fail", "Sign-out failed"),
    ("logout_success", "You are signed out."),
    ("news_empty", "No news found right now."),
    ("news_error", "Loading news failed"),
    ("record_missing", "The record was already deleted"),
    ("testimonial_default_text", "No testimonial text"),
    ("testimonial_delete_fail", "Deleting the testimonial failed"),
    ("testimonial_delete_success", "The testimonial was deleted."),
    ("testimonial_fetch_error", "Loading testimonials failed"),
    ("upload_error", "Image upload failed"),
    ("upload_success", "The image was updated."),
    ("month_0", "January"),
    ("month_1", "February"),
    ("month_2", "March"),
    ("month_3", "April"),
    ("month_4", "May"),
    ("month_5", "June"),
    ("month_6", "July"),
    ("month_7", "August"),
    ("month_8", "September"),
    ("month_9", "October"),
    ("month_10", "November"),
    ("month_11", "December"),
];

const RU: &[(&str, &str)] = &[
    ("admin_required", "Это действие доступно только администратору."),
    ("delete_fail", "Ошибка при удалении"),
    ("delete_success", "Мероприятие удалено."),
    ("error_no_images", "Пожалуйста, выберите хотя бы одно изображение."),
    ("error_not_image", "Выбранный файл не является изображением."),
    ("error_required_fields", "Пожалуйста, заполните все обязательные поля."),
    ("event_add_fail", "Ошибка при добавлении мероприятия"),
    ("event_add_success", "Мероприятие добавлено."),
    ("fetch_error", "Ошибка при загрузке мероприятий"),
    ("form_error", "Ошибка при отправке"),
    ("form_success", "Спасибо, ваш отзыв отправлен."),
    ("login_fail", "Ошибка входа"),
    ("logout_fail", "Ошибка выхода"),
    ("logout_success", "Вы вышли."),
    ("news_empty", "Новости сейчас не найдены."),
    ("news_error", "Ошибка при загрузке новостей"),
    ("record_missing", "Запись уже удалена"),
    ("testimonial_default_text", "Текст отзыва отсутствует"),
    ("testimonial_delete_fail", "Не удалось удалить отзыв"),
    ("testimonial_delete_success", "Отзыв удалён."),
    ("testimonial_fetch_error", "Ошибка при загрузке отзывов"),
    ("upload_error", "Ошибка загрузки изображения"),
    ("upload_success", "Изображение обновлено."),
    ("month_0", "января"),
    ("month_1", "февраля"),
    ("month_2", "марта"),
    ("month_3", "апреля"),
    ("month_4", "мая"),
    ("month_5", "июня"),
    ("month_6", "июля"),
    ("month_7", "августа"),
    ("month_8", "сентября"),
    ("month_9", "октября"),
    ("month_10", "ноября"),
    ("month_11", "декабря"),
];

/// The raw table for a language.
pub fn table(language: Language) -> &'static [(&'static str, &'static str)] {
    match language {
        Language::Am => AM,
        Language::En => EN,
        Language::Ru => RU,
    }
}
